//! Form body extractor accepting both urlencoded and multipart submissions.
//!
//! Browser forms carrying files arrive as `multipart/form-data`; simple API
//! clients post `application/x-www-form-urlencoded`. Handlers see the same
//! [`FormData`] either way.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;

use crate::error::AppError;
use crate::uploads::UploadedFile;

/// Text fields and file parts of a submitted form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<(String, UploadedFile)>,
}

impl FormData {
    /// Trimmed value of a text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// File parts submitted under `name`, in submission order.
    ///
    /// Parts with an empty filename (an untouched file input) are left out.
    pub fn files(&self, name: &str) -> Vec<UploadedFile> {
        self.files
            .iter()
            .filter(|(field, file)| field == name && !file.filename.is_empty())
            .map(|(_, file)| file.clone())
            .collect()
    }

    /// First file part submitted under `name`.
    pub fn file(&self, name: &str) -> Option<UploadedFile> {
        self.files(name).into_iter().next()
    }

    fn insert_text(&mut self, name: String, value: String) {
        self.fields.entry(name).or_insert(value);
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut form = FormData::default();

        if !is_multipart(&req) {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| mp_core::Error::Validation(e.body_text()))?;
            for (name, value) in fields {
                form.insert_text(name, value);
            }
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| mp_core::Error::Validation(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| mp_core::Error::Validation(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| mp_core::Error::Validation(e.body_text()))?;
                    form.files.push((name, UploadedFile::new(filename, data)));
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| mp_core::Error::Validation(e.body_text()))?;
                    form.insert_text(name, value);
                }
            }
        }

        Ok(form)
    }
}
