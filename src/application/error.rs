use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{admin::LoadError, backend::BackendError},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Diagnostic attached to failed responses and consumed by the logging
/// middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_backend(source: &'static str, error: &BackendError) -> Self {
        let (status, public_message) = backend_failure(error);
        Self::from_error(source, status, public_message, error)
    }

    pub fn from_load(source: &'static str, error: &LoadError) -> Self {
        let (status, public_message) = backend_failure(&error.source);
        Self::from_error(source, status, public_message, error)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn public_message(&self) -> &'static str {
        self.public_message
    }
}

fn backend_failure(error: &BackendError) -> (StatusCode, &'static str) {
    match error {
        BackendError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16() => {
            (StatusCode::NOT_FOUND, "Data tidak ditemukan")
        }
        BackendError::Status { status, .. }
            if *status == StatusCode::UNAUTHORIZED.as_u16()
                || *status == StatusCode::FORBIDDEN.as_u16() =>
        {
            (StatusCode::FORBIDDEN, "Akses ditolak oleh server")
        }
        BackendError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Server tidak merespons"),
        BackendError::Decode(_) | BackendError::MissingProps(_) => {
            (StatusCode::BAD_GATEWAY, "Respons server tidak dikenali")
        }
        _ => (StatusCode::BAD_GATEWAY, "Server sedang bermasalah"),
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Domain(DomainError::UnknownKey { .. })
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Backend(_) | AppError::Load(_) => StatusCode::BAD_GATEWAY,
            AppError::Infra(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) => "Data tidak ditemukan",
            AppError::Domain(_) | AppError::Validation(_) => "Permintaan tidak dapat diproses",
            AppError::Backend(_) | AppError::Load(_) => "Server sedang bermasalah",
            AppError::Infra(InfraError::Configuration { .. }) => "Konfigurasi tidak valid",
            AppError::Infra(_) | AppError::Unexpected(_) => "Terjadi kesalahan tak terduga",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.presentation_message();
        let report = ErrorReport::from_error("application::error::AppError", status, &self);
        let mut response = (status, message).into_response();
        report.attach(&mut response);
        response
    }
}
