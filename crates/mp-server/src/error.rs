//! Error-to-HTTP response conversion.
//!
//! [`AppError`] renders [`mp_core::Error`] as a JSON body for API routes;
//! [`PageError`] renders the same errors as HTML for the browser views.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

use crate::render;

fn status_of(err: &mp_core::Error) -> StatusCode {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(status = %status, error = %err, "Server error in handler");
    }
    status
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub mp_core::Error);

impl From<mp_core::Error> for AppError {
    fn from(e: mp_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Error type for server-rendered pages.
#[derive(Debug)]
pub struct PageError(pub mp_core::Error);

impl From<mp_core::Error> for PageError {
    fn from(e: mp_core::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let message = if status.is_server_error() {
            "Something went wrong.".to_string()
        } else {
            self.0.to_string()
        };
        (status, Html(render::error_page(status, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_core::Error;

    #[test]
    fn not_found_produces_404() {
        let response = AppError(Error::not_found("manga", 1)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_produces_400() {
        let response =
            AppError(Error::Validation("Missing required fields".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn filesystem_produces_500() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let response = AppError(Error::filesystem("uploads", io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn page_error_is_html() {
        let response = PageError(Error::not_found("chapter", 9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}
