//! Multipart form payload parsing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use thiserror::Error;
use tracing::error;

use crate::application::{
    error::HttpError,
    forms::{FormDraft, FormIntake},
    uploads::{FileSelection, SelectedFile},
};

const SOURCE: &str = "infra::http::admin::multipart";

/// Text fields of a submitted form plus the first non-empty file.
#[derive(Debug, Default)]
pub(super) struct FormPayload {
    pub(super) draft: FormDraft,
    pub(super) files: FileSelection,
}

#[derive(Debug, Error)]
pub(super) enum FormPayloadError {
    #[error("payload exceeds the configured upload limit")]
    PayloadTooLarge,
    #[error("malformed multipart payload")]
    InvalidFormData,
    #[error("failed to read multipart payload: {0}")]
    Read(String),
}

impl IntoResponse for FormPayloadError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            FormPayloadError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Berkas terlalu besar")
            }
            FormPayloadError::InvalidFormData => {
                (StatusCode::BAD_REQUEST, "Data formulir tidak valid")
            }
            FormPayloadError::Read(_) => (StatusCode::BAD_REQUEST, "Gagal membaca formulir"),
        };
        HttpError::from_error(SOURCE, status, message, &self).into_response()
    }
}

pub(super) async fn read_form_payload(
    multipart: &mut Multipart,
) -> Result<FormPayload, FormPayloadError> {
    let mut payload = FormPayload::default();
    let mut intake = FormIntake::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                let status = err.status();
                error!(
                    target = SOURCE,
                    status = status.as_u16(),
                    error = %err,
                    "failed to read multipart payload"
                );
                return Err(match status {
                    StatusCode::PAYLOAD_TOO_LARGE => FormPayloadError::PayloadTooLarge,
                    StatusCode::BAD_REQUEST => FormPayloadError::InvalidFormData,
                    _ => FormPayloadError::Read(err.to_string()),
                });
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(|mime| mime.to_string());
                let bytes = field.bytes().await.map_err(|err| match err.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => FormPayloadError::PayloadTooLarge,
                    _ => FormPayloadError::Read(err.to_string()),
                })?;
                payload
                    .files
                    .offer(SelectedFile::new(name, file_name, content_type, bytes));
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| FormPayloadError::InvalidFormData)?;
                intake.insert(&name, value);
            }
        }
    }
    payload.draft = intake.finish();
    Ok(payload)
}
