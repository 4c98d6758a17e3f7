use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use serde::Deserialize;

use crate::{
    application::{
        admin::resources::{FormMode, normalize_quantities, preview_field},
        backend::{PageProps, SubmitOutcome},
        forms::{FieldErrors, FormDraft},
        resources::{FieldKind, Resource},
        stream::StreamBuilder,
        uploads::{PreviewHandle, PreviewSlot},
    },
    infra::http::admin::{
        AdminState,
        multipart::{FormPayload, read_form_payload},
        previews::record_previews_live,
        selectors::{PANEL, file_preview},
        shared::{bad_request, datastar_replace, error_page, toast_failure},
    },
    presentation::{
        admin::views as admin_views,
        views::{render_html, render_template_response},
    },
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RowsParams {
    action: String,
    group: String,
    index: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PreviewParams {
    field: String,
}

pub(crate) async fn resource_new<R: Resource>(State(state): State<AdminState>) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_new";
    let chrome = state.chrome.load(R::index_path());
    let props = match state.resources.load_form_props::<R>(FormMode::Create).await {
        Ok(props) => props,
        Err(err) => return error_page(chrome, SOURCE, &err, R::index_path()),
    };

    // New records start with one blank row per item group.
    let mut draft = FormDraft::new();
    for group in R::item_groups(&props) {
        draft.set_group(group.name, draft.group(group.name).add());
    }

    form_page::<R>(&state, chrome, FormMode::Create, &props, &draft, SOURCE)
}

pub(crate) async fn resource_edit<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_edit";
    let chrome = state.chrome.load(R::index_path());
    let (props, draft) = match state.resources.load_edit::<R>(id).await {
        Ok(loaded) => loaded,
        Err(err) => return error_page(chrome, SOURCE, &err, R::index_path()),
    };

    form_page::<R>(&state, chrome, FormMode::Edit(id), &props, &draft, SOURCE)
}

fn form_page<R: Resource>(
    state: &AdminState,
    chrome: admin_views::AdminChrome,
    mode: FormMode,
    props: &PageProps,
    draft: &FormDraft,
    source: &'static str,
) -> Response {
    let content = state
        .resources
        .form_view::<R>(mode, props, draft, &FieldErrors::new());
    let heading = content.heading.clone();
    let panel_html = match render_html(&admin_views::ResourceFormPanelTemplate { content }, source)
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

pub(crate) async fn resource_create<R: Resource>(
    State(state): State<AdminState>,
    mut multipart: Multipart,
) -> Response {
    submit_form::<R>(&state, FormMode::Create, &mut multipart).await
}

pub(crate) async fn resource_update<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Response {
    submit_form::<R>(&state, FormMode::Edit(id), &mut multipart).await
}

fn file_field_name<R: Resource>(props: &PageProps) -> Option<&'static str> {
    R::form_fields(props)
        .into_iter()
        .find(|spec| matches!(spec.kind, FieldKind::File { .. }))
        .map(|spec| spec.name)
}

async fn submit_form<R: Resource>(
    state: &AdminState,
    mode: FormMode,
    multipart: &mut Multipart,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_submit";
    let FormPayload {
        mut draft,
        mut files,
    } = match read_form_payload(multipart).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let props = match state.resources.load_form_props::<R>(mode).await {
        Ok(props) => props,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    normalize_quantities(&R::item_groups(&props), &mut draft);

    // A re-rendered form loses its file input; the preview still holds the
    // bytes the user picked.
    let preview = file_field_name::<R>(&props)
        .and_then(|name| PreviewHandle::parse(draft.value(&preview_field(name))));
    let file = files
        .take()
        .or_else(|| preview.and_then(|handle| state.previews.get(handle)));

    let outcome = match state.resources.submit::<R>(mode, &draft, file).await {
        Ok(outcome) => outcome,
        Err(err) => return toast_failure(SOURCE, &err),
    };

    match outcome {
        SubmitOutcome::Accepted { .. } => {
            if let Some(handle) = preview {
                state.previews.release(handle);
                record_previews_live(&state.previews);
            }
            let flash = match mode {
                FormMode::Create => "created",
                FormMode::Edit(_) => "updated",
            };
            let mut stream = StreamBuilder::new();
            stream.push_redirect(&format!("{}?flash={flash}", R::index_path()));
            stream.into_response()
        }
        SubmitOutcome::Rejected(errors) => {
            render_form_panel::<R>(state, mode, &props, &draft, &errors, SOURCE)
        }
    }
}

fn render_form_panel<R: Resource>(
    state: &AdminState,
    mode: FormMode,
    props: &PageProps,
    draft: &FormDraft,
    errors: &FieldErrors,
    source: &'static str,
) -> Response {
    let content = state.resources.form_view::<R>(mode, props, draft, errors);
    match render_html(&admin_views::ResourceFormPanelTemplate { content }, source) {
        Ok(html) => datastar_replace(PANEL, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn resource_rows_new<R: Resource>(
    State(state): State<AdminState>,
    Query(params): Query<RowsParams>,
    mut multipart: Multipart,
) -> Response {
    edit_rows::<R>(&state, FormMode::Create, params, &mut multipart).await
}

pub(crate) async fn resource_rows_edit<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    Query(params): Query<RowsParams>,
    mut multipart: Multipart,
) -> Response {
    edit_rows::<R>(&state, FormMode::Edit(id), params, &mut multipart).await
}

/// Add or remove one item row, keeping everything else the user typed.
async fn edit_rows<R: Resource>(
    state: &AdminState,
    mode: FormMode,
    params: RowsParams,
    multipart: &mut Multipart,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_rows";
    let FormPayload { mut draft, .. } = match read_form_payload(multipart).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let props = match state.resources.load_form_props::<R>(mode).await {
        Ok(props) => props,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    let groups = R::item_groups(&props);
    let Some(group) = groups.iter().find(|group| group.name == params.group) else {
        return bad_request(SOURCE, format!("unknown item group `{}`", params.group));
    };

    let rows = draft.group(group.name);
    let rows = match (params.action.as_str(), params.index) {
        ("add", _) => rows.add(),
        ("remove", Some(index)) => rows.remove(index),
        (action, _) => return bad_request(SOURCE, format!("unsupported row action `{action}`")),
    };
    draft.set_group(group.name, rows);
    normalize_quantities(&groups, &mut draft);

    render_form_panel::<R>(state, mode, &props, &draft, &FieldErrors::new(), SOURCE)
}

pub(crate) async fn resource_preview_new<R: Resource>(
    State(state): State<AdminState>,
    Query(params): Query<PreviewParams>,
    mut multipart: Multipart,
) -> Response {
    preview_file::<R>(&state, FormMode::Create, params, &mut multipart).await
}

pub(crate) async fn resource_preview_edit<R: Resource>(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    Query(params): Query<PreviewParams>,
    mut multipart: Multipart,
) -> Response {
    preview_file::<R>(&state, FormMode::Edit(id), params, &mut multipart).await
}

/// Swap the preview of one file input for the file just picked.
async fn preview_file<R: Resource>(
    state: &AdminState,
    mode: FormMode,
    params: PreviewParams,
    multipart: &mut Multipart,
) -> Response {
    const SOURCE: &str = "infra::http::admin::resource_preview";
    let FormPayload {
        mut draft,
        mut files,
    } = match read_form_payload(multipart).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let props = match state.resources.load_form_props::<R>(mode).await {
        Ok(props) => props,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    if file_field_name::<R>(&props) != Some(params.field.as_str()) {
        return bad_request(SOURCE, format!("`{}` is not a file field", params.field));
    }

    let handle_key = preview_field(&params.field);
    let previous = PreviewHandle::parse(draft.value(&handle_key));
    let mut slot = PreviewSlot::adopt(state.previews.clone(), previous);
    slot.replace(files.take().filter(|file| file.field == params.field));
    let current = slot.detach();
    record_previews_live(&state.previews);

    draft.set(
        handle_key,
        current
            .map(|handle| handle.id().to_string())
            .unwrap_or_default(),
    );

    let Some(field) = state
        .resources
        .file_field_view::<R>(mode, &props, &draft, &params.field)
    else {
        return bad_request(SOURCE, format!("`{}` is not a file field", params.field));
    };

    match render_html(&admin_views::FilePreviewTemplate { field }, SOURCE) {
        Ok(html) => datastar_replace(&file_preview(&params.field), html).into_response(),
        Err(err) => err.into_response(),
    }
}
