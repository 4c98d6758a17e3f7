use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use metrics::gauge;

use crate::{
    application::{
        error::HttpError,
        uploads::{PreviewHandle, PreviewRegistry},
    },
    infra::backend::METRIC_PREVIEWS_LIVE,
};

use super::AdminState;

pub(super) fn record_previews_live(registry: &PreviewRegistry) {
    gauge!(METRIC_PREVIEWS_LIVE).set(registry.live() as f64);
}

/// Bytes of a file picked but not yet submitted.
pub(super) async fn admin_preview(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_preview";
    let file = PreviewHandle::parse(&id).and_then(|handle| state.previews.get(handle));
    let Some(file) = file else {
        return HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Pratinjau tidak ditemukan",
            format!("no preview `{id}`"),
        )
        .into_response();
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, file.content_type.as_str())
        .header(CACHE_CONTROL, "private, no-store")
        .body(Body::from(file.bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
