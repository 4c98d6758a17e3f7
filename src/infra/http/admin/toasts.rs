use axum::{
    extract::Form,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::{error::HttpError, stream::StreamBuilder};

use super::shared::{Toast, finish_with_toasts};

#[derive(Debug, Deserialize)]
pub(super) struct AdminToastForm {
    kind: String,
    message: String,
}

/// Client-raised notices (clipboard, validation in the browser) rendered
/// through the same stack as server toasts.
pub(super) async fn admin_toast(Form(form): Form<AdminToastForm>) -> Response {
    let toast = match form.kind.as_str() {
        "success" => Toast::success(form.message),
        "error" => Toast::error(form.message),
        other => {
            return HttpError::new(
                "infra::http::admin_toasts",
                StatusCode::BAD_REQUEST,
                "Jenis notifikasi tidak dikenal",
                format!("Unsupported toast kind `{other}`"),
            )
            .into_response();
        }
    };

    finish_with_toasts(StreamBuilder::new(), &[toast])
}
