use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    application::{
        admin::kehadiran::RekapScope,
        list_query::ListQuery,
    },
    presentation::{
        admin::views as admin_views,
        views::{render_html, render_template_response},
    },
};

use super::{
    AdminState,
    resources::list_location,
    selectors::KEHADIRAN_PANEL,
    shared::{bad_request, error_page, panel_stream, request_pairs, toast_failure},
};

fn decode(scope: RekapScope, pairs: &[(String, String)]) -> ListQuery {
    scope
        .schema()
        .decode(pairs.iter().map(|(key, value)| (key, value)))
}

pub(super) async fn admin_rekap(
    State(state): State<AdminState>,
    Path(segment): Path<String>,
    uri: Uri,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_rekap";
    let Some(scope) = RekapScope::parse(&segment) else {
        return bad_request(SOURCE, format!("unknown recap scope `{segment}`"));
    };
    let requested = decode(scope, &request_pairs(&uri, &[]));
    if uri.query().is_some() && scope.schema().is_default(&requested) {
        return Redirect::to(scope.path()).into_response();
    }

    let chrome = state.chrome.load(scope.path());
    let list = match state.kehadiran.load(scope, &requested).await {
        Ok(list) => list,
        Err(err) => return error_page(chrome, SOURCE, &err, "/"),
    };

    let content = state.kehadiran.view(&list);
    let heading = content.heading.clone();
    let panel_html = match render_html(&admin_views::KehadiranPanelTemplate { content }, SOURCE)
    {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };
    let page = admin_views::AdminPanelPageView {
        heading,
        panel_html,
        replace_location: None,
    };
    let view = admin_views::AdminLayout::new(chrome, page);
    render_template_response(admin_views::AdminPanelPageTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_rekap_panel(
    State(state): State<AdminState>,
    Path(segment): Path<String>,
    uri: Uri,
    body: Bytes,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_rekap_panel";
    let Some(scope) = RekapScope::parse(&segment) else {
        return bad_request(SOURCE, format!("unknown recap scope `{segment}`"));
    };
    let pairs = request_pairs(&uri, &body);
    let requested = decode(scope, &pairs);

    let list = match state.kehadiran.load(scope, &requested).await {
        Ok(list) => list,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    let content = state.kehadiran.view(&list);
    let panel_html = match render_html(&admin_views::KehadiranPanelTemplate { content }, SOURCE)
    {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let location = list_location(scope.schema(), &list.query);
    panel_stream(KEHADIRAN_PANEL, &pairs, panel_html, &location).into_response()
}
