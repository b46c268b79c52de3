//! Serving of stored upload files.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use mp_core::paths::image_content_type;

use crate::context::AppContext;
use crate::error::AppError;

/// GET /uploads/:filename
pub async fn serve_upload(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let path = ctx
        .uploads
        .resolve(&filename)
        .ok_or_else(|| mp_core::Error::not_found("upload", &filename))?;

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(mp_core::Error::not_found("upload", &filename).into());
        }
        Err(e) => return Err(mp_core::Error::filesystem(&path, e).into()),
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image_content_type(&filename))],
        data,
    ))
}
