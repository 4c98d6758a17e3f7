use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    application::{
        admin::resources::{ResourceList, flash_message},
        backend::SubmitOutcome,
        list_query::ListQuery,
        resources::Resource,
        stream::StreamBuilder,
    },
    infra::http::admin::{
        AdminState,
        selectors::resource_panel as panel_selector,
        shared::{
            Toast, datastar_replace, error_page, finish_with_toasts, pair_value, panel_stream,
            request_pairs, toast_failure, toast_items,
        },
    },
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::{list_location, render_list_panel};

const FLASH_PARAM: &str = "flash";

pub(crate) async fn resource_index<R: Resource>(
    State(state): State<AdminState>,
    uri: Uri,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_index";
    let schema = R::schema();
    let pairs = request_pairs(&uri, &[]);
    let flash = pair_value(&pairs, FLASH_PARAM).and_then(flash_message::<R>);
    let requested = schema.decode(pairs.iter().map(|(key, value)| (key, value)));

    if flash.is_none() && uri.query().is_some() && schema.is_default(&requested) {
        return Redirect::to(schema.path()).into_response();
    }

    let chrome = state.chrome.load(R::index_path());
    let list = match state.resources.load_list::<R>(&requested).await {
        Ok(list) => list,
        Err(err) => return error_page(chrome, SOURCE, &err, "/"),
    };

    let panel_html = match render_list_panel(&state, &list, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let toasts: Vec<Toast> = flash.into_iter().map(Toast::success).collect();
    let content = admin_views::AdminPanelPageView {
        heading: R::TITLE.to_string(),
        panel_html,
        // Drop the one-shot flash key from the address bar.
        replace_location: (!toasts.is_empty()).then(|| list_location(schema, &list.query)),
    };
    let view = admin_views::AdminLayout::new(chrome, content).with_toasts(toast_items(&toasts));
    render_template_response(admin_views::AdminPanelPageTemplate { view }, StatusCode::OK)
}

pub(crate) async fn resource_panel<R: Resource>(
    State(state): State<AdminState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_panel";
    let schema = R::schema();
    let pairs = request_pairs(&uri, &body);
    let requested = schema.decode(pairs.iter().map(|(key, value)| (key, value)));

    let list = match state.resources.load_list::<R>(&requested).await {
        Ok(list) => list,
        Err(err) => return toast_failure(SOURCE, &err),
    };

    let panel_html = match render_list_panel(&state, &list, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let location = list_location(schema, &list.query);
    panel_stream(&panel_selector(R::SLUG), &pairs, panel_html, &location).into_response()
}

pub(crate) async fn resource_delete<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    uri: Uri,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_delete";
    let pairs = request_pairs(&uri, &[]);
    let query = R::schema().decode(pairs.iter().map(|(key, value)| (key, value)));

    let toast = match state.resources.delete::<R>(id).await {
        Ok(SubmitOutcome::Accepted { message }) => Toast::success(
            message
                .or_else(|| flash_message::<R>("deleted"))
                .unwrap_or_default(),
        ),
        Ok(SubmitOutcome::Rejected(errors)) => Toast::error(
            errors
                .summary()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} tidak dapat dihapus.", R::SINGULAR)),
        ),
        Err(err) => return toast_failure(SOURCE, &err),
    };

    match refreshed_panel::<R>(&state, &query, SOURCE).await {
        Ok(stream) => finish_with_toasts(stream, &[toast]),
        Err(response) => response,
    }
}

/// Reload the list after a mutation. A page emptied by the mutation falls
/// back to the previous one.
pub(super) async fn refreshed_panel<R: Resource>(
    state: &AdminState,
    query: &ListQuery,
    source: &'static str,
) -> Result<StreamBuilder, Response> {
    let mut list: ResourceList<R> = state
        .resources
        .load_list::<R>(query)
        .await
        .map_err(|err| toast_failure(source, &err))?;
    if list.page.data.is_empty() && query.page > 1 {
        let previous = query.clone().with_page(query.page - 1);
        list = state
            .resources
            .load_list::<R>(&previous)
            .await
            .map_err(|err| toast_failure(source, &err))?;
    }

    let panel_html =
        render_list_panel(state, &list, source).map_err(IntoResponse::into_response)?;
    let mut stream = datastar_replace(&panel_selector(R::SLUG), panel_html);
    stream.push_history_replace(&list_location(R::schema(), &list.query));
    Ok(stream)
}
