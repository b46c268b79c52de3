//! Upload storage for cover and page images.
//!
//! [`UploadStore`] is the only code that writes under the upload root. It
//! applies the extension allow-list, reduces client names with
//! [`sanitize_name`], writes the bytes, and hands back the path relative to
//! the root that gets recorded in the database. Individual file failures are
//! logged and skipped so one bad file never sinks a batch.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use mp_core::config::UploadConfig;
use mp_core::paths::{is_safe_component, sanitize_name, validate_extension};
use mp_core::{Error, Result};
use mp_db::models::NewChapterImage;

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A file received from a multipart form, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name supplied by the client, untrusted.
    pub filename: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// A file that has been written under the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized client name.
    pub filename: String,
    /// Path relative to the upload root.
    pub stored_path: String,
}

impl From<StoredFile> for NewChapterImage {
    fn from(file: StoredFile) -> Self {
        NewChapterImage {
            filename: file.filename,
            stored_path: file.stored_path,
        }
    }
}

/// Filesystem-backed store rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    overwrite: bool,
}

impl UploadStore {
    /// Create a store writing into `root`.
    ///
    /// With `overwrite` set, a file whose sanitized name already exists is
    /// replaced. Otherwise `name-1.ext`, `name-2.ext`, ... is used.
    pub fn new(root: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            root: root.into(),
            overwrite,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.root.clone(), config.overwrite)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| Error::filesystem(&self.root, e))
    }

    /// Validate and sanitize a client filename.
    ///
    /// Returns `None` when the extension is not allow-listed or nothing
    /// usable survives sanitizing.
    pub fn accept_name(&self, filename: &str) -> Option<String> {
        if !validate_extension(filename) {
            return None;
        }
        let sanitized = sanitize_name(filename);
        validate_extension(&sanitized).then_some(sanitized)
    }

    /// Write `data` under the root as `sanitized_name`.
    ///
    /// Returns the stored path relative to the root, which differs from
    /// `sanitized_name` only when overwriting is disabled and the name is
    /// taken.
    pub fn persist(&self, data: &[u8], sanitized_name: &str) -> Result<StoredFile> {
        if !is_safe_component(sanitized_name) {
            return Err(Error::Validation(format!(
                "refusing to store unsanitized name {sanitized_name:?}"
            )));
        }
        self.ensure_root()?;

        let stored_path = if self.overwrite {
            let path = self.root.join(sanitized_name);
            let file = File::create(&path).map_err(|e| Error::filesystem(&path, e))?;
            write_or_discard(file, &path, data)?;
            sanitized_name.to_string()
        } else {
            self.write_new(data, sanitized_name)?
        };

        Ok(StoredFile {
            filename: sanitized_name.to_string(),
            stored_path,
        })
    }

    /// Validate, sanitize, and persist one upload.
    ///
    /// Rejections and write failures are logged and yield `None`.
    pub fn store(&self, file: &UploadedFile) -> Option<StoredFile> {
        let Some(name) = self.accept_name(&file.filename) else {
            tracing::warn!(filename = %file.filename, "Skipping upload with disallowed name");
            return None;
        };

        match self.persist(&file.data, &name) {
            Ok(stored) => {
                tracing::debug!(
                    stored_path = %stored.stored_path,
                    bytes = file.data.len(),
                    "Stored upload"
                );
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(filename = %file.filename, "Skipping upload: {e}");
                None
            }
        }
    }

    /// Store a batch in submission order, dropping files that fail.
    ///
    /// The position of each entry in the returned vector is its page index,
    /// so skipped files never leave a gap.
    pub fn store_batch(&self, files: &[UploadedFile]) -> Vec<StoredFile> {
        let stored: Vec<StoredFile> = files.iter().filter_map(|f| self.store(f)).collect();
        if stored.len() < files.len() {
            tracing::info!(
                received = files.len(),
                stored = stored.len(),
                "Upload batch had skipped files"
            );
        }
        stored
    }

    /// Resolve a request-supplied name to a path under the root.
    ///
    /// Only single sanitized components are accepted, so the result can
    /// never escape the upload root.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        is_safe_component(name).then(|| self.root.join(name))
    }

    /// URL under which a stored path is served.
    pub fn public_url(stored_path: &str) -> String {
        format!("{PUBLIC_PREFIX}/{stored_path}")
    }

    /// Write to the first free `stem-N.ext` name, starting with the name itself.
    ///
    /// Suffixed candidates are sanitized again, so a device-name prefix that
    /// no longer applies (`_con.png` becoming `con-1.png`) is dropped and
    /// every returned name passes [`UploadStore::resolve`].
    fn write_new(&self, data: &[u8], sanitized_name: &str) -> Result<String> {
        let (stem, ext) = match sanitized_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (sanitized_name, None),
        };

        for n in 0u32.. {
            let candidate = match (n, ext) {
                (0, _) => sanitized_name.to_string(),
                (n, Some(ext)) => sanitize_name(&format!("{stem}-{n}.{ext}")),
                (n, None) => sanitize_name(&format!("{stem}-{n}")),
            };
            if !is_safe_component(&candidate) {
                continue;
            }
            let path = self.root.join(&candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_discard(file, &path, data)?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(Error::filesystem(&path, e)),
            }
        }

        Err(Error::Internal(format!("no free name for {sanitized_name}")))
    }
}

/// Write `data` to an opened file, removing it again if the write fails.
fn write_or_discard(mut file: File, path: &Path, data: &[u8]) -> Result<()> {
    if let Err(e) = file.write_all(data) {
        drop(file);
        discard_partial(path);
        return Err(Error::filesystem(path, e));
    }
    Ok(())
}

/// Remove a file left behind by a failed write.
fn discard_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), "Could not remove partial upload: {e}");
    }
}
