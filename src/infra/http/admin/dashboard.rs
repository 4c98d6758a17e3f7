use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};

use crate::{
    application::stream::StreamBuilder,
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::{AdminState, selectors::MODAL_HOST};

pub(super) async fn admin_dashboard(State(state): State<AdminState>) -> Response {
    let chrome = state.chrome.load("/");
    let content = state.dashboard.overview().await;

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminDashboardTemplate { view }, StatusCode::OK)
}

/// Empty the modal host; closing never talks to the backend.
pub(super) async fn admin_modal_close() -> Response {
    let mut stream = StreamBuilder::new();
    stream.push_clear(MODAL_HOST);
    stream.into_response()
}
