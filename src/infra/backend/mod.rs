//! Backend gateway adapters.

mod client;

pub use client::HttpBackend;

pub const METRIC_BACKEND_REQUESTS_TOTAL: &str = "sekretariat_backend_requests_total";
pub const METRIC_BACKEND_REQUEST_MS: &str = "sekretariat_backend_request_ms";
pub const METRIC_PREVIEWS_LIVE: &str = "sekretariat_previews_live";
