use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// A file part received in a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A write payload that may arrive either as a JSON object or as
/// `multipart/form-data`.
///
/// Multipart text parts become string values; file parts are collected per
/// field name in arrival order. A JSON body never carries files.
#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    files: Vec<(String, UploadedFile)>,
}

impl FormPayload {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            files: Vec::new(),
        }
    }

    /// Deserialize the non-file fields into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Remove and return every file sent under `field`.
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.files = rest;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    /// Remove and return the first file sent under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        self.take_files(field).into_iter().next()
    }

    fn push_file(&mut self, field: String, file: UploadedFile) {
        self.files.push((field, file));
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            return read_multipart(multipart).await;
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        match value {
            Value::Object(fields) => Ok(FormPayload::from_fields(fields)),
            _ => Err(AppError::Validation(
                "Request body must be a JSON object".into(),
            )),
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormPayload, AppError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;

                // Browsers send an empty, unnamed part for an untouched file input.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                if bytes.is_empty() {
                    return Err(AppError::field(&name, "The submitted file is empty."));
                }

                let content_type = content_type.or_else(|| {
                    mime_guess::from_path(&filename)
                        .first()
                        .map(|m| m.to_string())
                });
                payload.push_file(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
                payload.fields.insert(name, Value::String(text));
            }
        }
    }

    Ok(payload)
}
