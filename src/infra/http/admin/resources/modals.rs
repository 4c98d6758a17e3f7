use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Uri,
    response::Response,
};

use crate::{
    application::{
        admin::resources::StatusModal, backend::SubmitOutcome, list_query::ListQuery,
        resources::Resource, stream::StreamBuilder,
    },
    infra::http::admin::{
        AdminState,
        selectors::MODAL_HOST,
        shared::{
            Toast, finish_with_toasts, pair_value, render_modal, request_pairs, toast_failure,
        },
    },
    presentation::admin::views as admin_views,
};

use super::list::refreshed_panel;

const STATUS_FIELD: &str = "status";

fn decode_query<R: Resource>(pairs: &[(String, String)]) -> ListQuery {
    R::schema().decode(pairs.iter().map(|(key, value)| (key, value)))
}

/// Render the status modal, or empty the host once it is closed.
fn show_status_modal<R: Resource>(
    state: &AdminState,
    modal: &StatusModal<R>,
    query: &ListQuery,
    error: Option<String>,
    source: &'static str,
) -> Response {
    match state.resources.status_modal_view::<R>(modal, query, error) {
        Some(content) => render_modal(&admin_views::StatusModalTemplate { content }, source),
        None => {
            let mut stream = StreamBuilder::new();
            stream.push_clear(MODAL_HOST);
            stream.into_response()
        }
    }
}

/// Open the status modal; the list state rides along so the panel can be
/// refreshed in place after the change.
pub(crate) async fn resource_status_modal<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    uri: Uri,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_status_modal";
    let query = decode_query::<R>(&request_pairs(&uri, &[]));
    let modal = match state.resources.open_status_modal::<R>(id).await {
        Ok(modal) => modal,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    show_status_modal::<R>(&state, &modal, &query, None, SOURCE)
}

pub(crate) async fn resource_status_update<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    uri: Uri,
    body: Bytes,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_status_update";
    let pairs = request_pairs(&uri, &body);
    let query = decode_query::<R>(&pairs);
    let status = pair_value(&pairs, STATUS_FIELD)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let rejection = if status.is_empty() {
        Some("Pilih status terlebih dahulu.".to_string())
    } else {
        match state.resources.update_status::<R>(id, &status).await {
            Ok(SubmitOutcome::Accepted { message }) => {
                let mut stream = match refreshed_panel::<R>(&state, &query, SOURCE).await {
                    Ok(stream) => stream,
                    Err(response) => return response,
                };
                stream.push_clear(MODAL_HOST);
                let text = message.unwrap_or_else(|| {
                    format!("Status {} diperbarui.", R::SINGULAR.to_lowercase())
                });
                return finish_with_toasts(stream, &[Toast::success(text)]);
            }
            Ok(SubmitOutcome::Rejected(errors)) => Some(
                errors
                    .first(STATUS_FIELD)
                    .or_else(|| errors.summary())
                    .unwrap_or("Status tidak dapat diubah.")
                    .to_string(),
            ),
            Err(err) => return toast_failure(SOURCE, &err),
        }
    };

    // Rejected: show the modal again with the message and the picked value.
    let mut modal = match state.resources.open_status_modal::<R>(id).await {
        Ok(modal) => modal,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    if let Some(draft) = modal.draft_mut().filter(|_| !status.is_empty()) {
        *draft = status;
    }
    show_status_modal::<R>(&state, &modal, &query, rejection, SOURCE)
}

pub(crate) async fn resource_detail<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_detail";
    let record = match state.resources.load_record::<R>(id).await {
        Ok(record) => record,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    let content = state.resources.detail_view::<R>(&record);
    render_modal(&admin_views::DetailModalTemplate { content }, SOURCE)
}

