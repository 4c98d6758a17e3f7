use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::infra::http::admin::AdminState;

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
    checked_at: String,
    previews_live: usize,
}

/// Liveness of the console itself; the backend is not probed.
pub(super) async fn admin_health(State(state): State<AdminState>) -> impl IntoResponse {
    let checked_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        checked_at,
        previews_live: state.previews.live(),
    })
}
