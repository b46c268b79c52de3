//! Filename rules for uploaded page and cover images.
//!
//! Uploads are accepted only for a fixed set of image extensions, and every
//! client-supplied name is reduced to a single safe path component before it
//! touches the upload root.

/// Image extensions accepted for upload (compared case-insensitively).
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Reserved device names that cannot be used as file stems on Windows.
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "AUX", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1",
    "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "PRN", "NUL",
];

/// Check whether a filename carries an allow-listed image extension.
///
/// True iff the name contains a dot and the lowercase suffix after the last
/// dot is one of `png`, `jpg`, `jpeg`, `gif`.
///
/// # Examples
///
/// ```
/// use mp_core::paths::validate_extension;
///
/// assert!(validate_extension("a.PNG"));
/// assert!(!validate_extension("a"));
/// assert!(!validate_extension("a.exe"));
/// ```
pub fn validate_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe, flat name.
///
/// Path separators become spaces, whitespace runs collapse into `_`, every
/// character outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// `.`/`_` are trimmed. The extension survives for any name that passed
/// [`validate_extension`]. The result can be empty.
///
/// # Examples
///
/// ```
/// use mp_core::paths::sanitize_name;
///
/// assert_eq!(sanitize_name("My Page 01.png"), "My_Page_01.png");
/// assert_eq!(sanitize_name("../../etc/passwd"), "etc_passwd");
/// ```
pub fn sanitize_name(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Check that `name` is a single component [`sanitize_name`] would produce.
///
/// Used before joining a request-supplied name onto the upload root.
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty() && sanitize_name(name) == name
}

/// Content type for a stored image, derived from its extension.
pub fn image_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
