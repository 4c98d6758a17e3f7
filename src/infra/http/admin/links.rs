//! Stored files and exports live on the backend; the console only points
//! the browser there.

use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

use crate::application::{
    backend::{ExportFormat, storage_path},
    error::HttpError,
};

use super::{
    AdminState,
    shared::{pair_value, request_pairs},
};

pub(super) async fn admin_storage(
    State(state): State<AdminState>,
    Path(path): Path<String>,
) -> Response {
    if path.split('/').any(|segment| segment == "..") {
        return HttpError::new(
            "infra::http::admin::admin_storage",
            StatusCode::BAD_REQUEST,
            "Permintaan tidak valid",
            format!("rejected storage path `{path}`"),
        )
        .into_response();
    }
    Redirect::temporary(&state.backend.public_url(&storage_path(&path))).into_response()
}

pub(super) async fn admin_export(
    State(state): State<AdminState>,
    Path(segment): Path<String>,
    uri: Uri,
) -> Response {
    let pairs = request_pairs(&uri, &[]);
    let Some(format) = ExportFormat::from_segment(&segment, pair_value(&pairs, "format")) else {
        return HttpError::new(
            "infra::http::admin::admin_export",
            StatusCode::NOT_FOUND,
            "Format ekspor tidak dikenal",
            format!("unknown export `{segment}`"),
        )
        .into_response();
    };
    Redirect::temporary(&state.backend.public_url(format.path())).into_response()
}
