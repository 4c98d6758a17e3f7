//! Gateway to the external backend that owns every record.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::application::{forms::FieldErrors, pagination::Paginated, uploads::MultipartBody};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend request timed out")]
    Timeout,
    #[error("backend responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode backend payload: {0}")]
    Decode(String),
    #[error("page props are missing `{0}`")]
    MissingProps(String),
    #[error("invalid backend url: {0}")]
    Url(String),
}

impl BackendError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// HTTP verb a form submission stands for. Anything but `Post` travels as a
/// POST carrying a `_method` override field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Post,
    Put,
    Patch,
}

impl FormMethod {
    pub fn override_value(self) -> Option<&'static str> {
        match self {
            FormMethod::Post => None,
            FormMethod::Put => Some("PUT"),
            FormMethod::Patch => Some("PATCH"),
        }
    }
}

/// Result of a mutation: accepted, or rejected with per-field messages.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted { message: Option<String> },
    Rejected(FieldErrors),
}

impl SubmitOutcome {
    pub fn accepted() -> Self {
        SubmitOutcome::Accepted { message: None }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Full payload a backend route returns to hydrate a page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageProps(serde_json::Value);

impl PageProps {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// The `filters` object echoing the parameters the backend applied.
    pub fn filters_echo(&self) -> Option<&serde_json::Value> {
        self.0.get("filters").filter(|value| value.is_object())
    }

    pub fn collection<T: DeserializeOwned>(&self, key: &str) -> Result<Paginated<T>, BackendError> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| BackendError::MissingProps(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(BackendError::decode)
    }

    /// A plain array, or an empty list when the key is absent.
    pub fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, BackendError> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(BackendError::decode),
        }
    }

    pub fn record<T: DeserializeOwned>(&self, key: &str) -> Result<T, BackendError> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| BackendError::MissingProps(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(BackendError::decode)
    }
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// GET a page route and return its props.
    async fn fetch_props(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<PageProps, BackendError>;

    /// GET a plain JSON resource outside the page model.
    async fn fetch_json(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, BackendError>;

    /// Send a multipart body. It always travels as a POST; any other verb is
    /// carried by a `_method` override field.
    async fn submit(
        &self,
        method: FormMethod,
        path: &str,
        body: MultipartBody,
    ) -> Result<SubmitOutcome, BackendError>;

    /// Send a JSON body with the given verb (status updates).
    async fn submit_json(
        &self,
        method: FormMethod,
        path: &str,
        body: serde_json::Value,
    ) -> Result<SubmitOutcome, BackendError>;

    async fn delete(&self, path: &str) -> Result<SubmitOutcome, BackendError>;

    /// Absolute URL for a backend path (storage files, exports).
    fn public_url(&self, path: &str) -> String;
}

/// Fetch a JSON array and decode it.
pub async fn fetch_array<T: DeserializeOwned>(
    backend: &dyn BackendGateway,
    path: &str,
    params: &[(String, String)],
) -> Result<Vec<T>, BackendError> {
    let value = backend.fetch_json(path, params).await?;
    let items = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut object) => object
            .remove("data")
            .filter(serde_json::Value::is_array)
            .ok_or_else(|| BackendError::decode("expected a JSON array"))?,
        _ => return Err(BackendError::decode("expected a JSON array")),
    };
    serde_json::from_value(items).map_err(BackendError::decode)
}

pub fn storage_path(file: &str) -> String {
    format!("/storage/{}", file.trim_start_matches('/'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Csv,
    Pdf,
    Word,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Excel,
        ExportFormat::Csv,
        ExportFormat::Pdf,
        ExportFormat::Word,
    ];

    pub fn path(self) -> &'static str {
        match self {
            ExportFormat::Excel => "/export/excel",
            ExportFormat::Csv => "/export/excel?format=csv",
            ExportFormat::Pdf => "/export/pdf",
            ExportFormat::Word => "/export/word",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Excel => "Excel",
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Word => "Word",
        }
    }

    pub fn from_segment(segment: &str, format: Option<&str>) -> Option<Self> {
        match (segment, format) {
            ("excel", Some("csv")) => Some(ExportFormat::Csv),
            ("excel", _) => Some(ExportFormat::Excel),
            ("pdf", _) => Some(ExportFormat::Pdf),
            ("word", _) => Some(ExportFormat::Word),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn props_expose_collections_and_echo() {
        let props = PageProps::new(json!({
            "barang": {"data": [{"id": 1}], "current_page": 1, "last_page": 1, "per_page": 10, "total": 1},
            "filters": {"search": "kursi"}
        }));
        let page: Paginated<serde_json::Value> = props.collection("barang").expect("collection");
        assert_eq!(page.total, 1);
        assert!(props.filters_echo().is_some());
        assert!(matches!(
            props.collection::<serde_json::Value>("pelanggan"),
            Err(BackendError::MissingProps(key)) if key == "pelanggan"
        ));
    }

    #[test]
    fn missing_lists_are_empty() {
        let props = PageProps::new(json!({"roles": null}));
        let roles: Vec<serde_json::Value> = props.list("roles").expect("list");
        assert!(roles.is_empty());
    }

    #[test]
    fn export_segments_map_to_formats() {
        assert_eq!(ExportFormat::from_segment("excel", Some("csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_segment("excel", None), Some(ExportFormat::Excel));
        assert_eq!(ExportFormat::from_segment("zip", None), None);
        assert_eq!(ExportFormat::Csv.path(), "/export/excel?format=csv");
    }

    #[test]
    fn storage_paths_are_rooted() {
        assert_eq!(storage_path("/barang/kursi.jpg"), "/storage/barang/kursi.jpg");
    }
}
