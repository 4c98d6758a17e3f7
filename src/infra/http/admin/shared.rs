use std::time::Duration;

use askama::{Error as AskamaError, Template};
use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use tracing::warn;
use url::form_urlencoded;
use uuid::Uuid;

use super::selectors::{MODAL_HOST, TOAST_STACK, ticketed};
use crate::{
    application::{
        admin::{
            LoadError,
            resources::{HISTORY_FIELD, TICKET_FIELD},
        },
        backend::BackendError,
        error::{ErrorReport, HttpError},
        sequence::Ticket,
        stream::StreamBuilder,
        ui::VisitMode,
    },
    presentation::{
        admin::views as admin_views,
        views::{TemplateRenderError, render_html, render_template_response},
    },
};

#[derive(Clone)]
pub(super) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy)]
pub(super) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, text)
    }

    fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }
}

pub(super) fn toast_items(toasts: &[Toast]) -> Vec<admin_views::AdminToastItem> {
    toasts
        .iter()
        .map(|toast| admin_views::AdminToastItem {
            id: toast.id.to_string(),
            kind: toast.kind.as_variant(),
            text: toast.text.clone(),
            ttl_ms: toast.ttl.as_millis() as u64,
        })
        .collect()
}

pub(super) fn push_toasts(stream: &mut StreamBuilder, toasts: &[Toast]) -> Result<(), HttpError> {
    let template = admin_views::AdminToastStackTemplate {
        toasts: toast_items(toasts),
    };

    let html = template.render().map_err(|err| {
        template_render_http_error(
            "infra::http::admin::push_toasts",
            "Gagal menampilkan notifikasi",
            err,
        )
    })?;

    stream.push_patch(html, TOAST_STACK, ElementPatchMode::Replace);
    Ok(())
}

pub(super) fn datastar_replace(selector: &str, html: String) -> StreamBuilder {
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, selector, ElementPatchMode::Replace);
    stream
}

/// Answer to a panel navigation. A ticketed request patches the panel and
/// moves the address bar only while the panel still carries that ticket.
pub(super) fn panel_stream(
    selector: &str,
    pairs: &[(String, String)],
    html: String,
    location: &str,
) -> StreamBuilder {
    let ticket = pair_value(pairs, TICKET_FIELD).and_then(Ticket::parse);
    let mode = match pair_value(pairs, HISTORY_FIELD) {
        Some("replace") => VisitMode::Replace,
        _ => VisitMode::Push,
    };
    let target = ticketed(selector, ticket);

    let mut stream = StreamBuilder::new();
    // History first: the patch drops the ticket attribute.
    stream.push_guarded_history(&target, location, mode);
    stream.push_patch(html, &target, ElementPatchMode::Replace);
    stream
}

/// Show a rendered modal inside the modal host.
pub(super) fn render_modal<T: Template>(template: &T, source: &'static str) -> Response {
    match render_html(template, source) {
        Ok(html) => {
            let mut stream = StreamBuilder::new();
            stream.push_patch(html, MODAL_HOST, ElementPatchMode::Inner);
            stream.into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Close the stream with toasts appended, or fail the whole response when
/// the toast stack cannot be rendered.
pub(super) fn finish_with_toasts(mut stream: StreamBuilder, toasts: &[Toast]) -> Response {
    if !toasts.is_empty()
        && let Err(err) = push_toasts(&mut stream, toasts)
    {
        return err.into_response();
    }
    stream.into_response()
}

/// Text shown to the user for a failed backend call. Backend messages win
/// over the generic wording.
pub(super) fn failure_message(source: &'static str, err: &LoadError) -> String {
    match &err.source {
        BackendError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
        _ => HttpError::from_load(source, err).public_message().to_string(),
    }
}

/// A failed interaction answered with an error toast instead of a page.
pub(super) fn toast_failure(source: &'static str, err: &LoadError) -> Response {
    warn!(
        target = "sekretariat::http::admin",
        source,
        error = %err,
        cause = %err.source,
        "interaction failed"
    );
    finish_with_toasts(
        StreamBuilder::new(),
        &[Toast::error(failure_message(source, err))],
    )
}

/// Full error page for a GET that could not load its data.
pub(super) fn error_page(
    chrome: admin_views::AdminChrome,
    source: &'static str,
    err: &LoadError,
    back_href: &str,
) -> Response {
    let http = HttpError::from_load(source, err);
    let status = http.status();
    let content = admin_views::AdminErrorView {
        heading: format!("Gagal memuat {}", err.what.to_lowercase()),
        message: failure_message(source, err),
        back_href: back_href.to_string(),
    };
    let view = admin_views::AdminLayout::new(chrome, content);
    let mut response =
        render_template_response(admin_views::AdminErrorTemplate { view }, status);
    ErrorReport::from_error(source, status, err).attach(&mut response);
    response
}

/// Pairs from the request URI followed by the urlencoded body, so body
/// values override the query string.
pub(super) fn request_pairs(uri: &Uri, body: &[u8]) -> Vec<(String, String)> {
    let mut pairs = form_pairs(uri.query().unwrap_or_default().as_bytes());
    pairs.extend(form_pairs(body));
    pairs
}

pub(super) fn form_pairs(encoded: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(encoded)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

pub(super) fn pair_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, value)| value.as_str())
}

pub(super) fn template_render_http_error(
    source: &'static str,
    message: &'static str,
    err: AskamaError,
) -> HttpError {
    HttpError::from(TemplateRenderError::new(source, message, err))
}

pub(super) fn bad_request(source: &'static str, detail: impl Into<String>) -> Response {
    HttpError::new(
        source,
        StatusCode::BAD_REQUEST,
        "Permintaan tidak valid",
        detail,
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_pairs_follow_query_pairs() {
        let uri: Uri = "/barang/panel?_history=replace&search=meja"
            .parse()
            .expect("uri");
        let pairs = request_pairs(&uri, b"search=kursi+lipat&page=2");
        assert_eq!(pair_value(&pairs, "search"), Some("kursi lipat"));
        assert_eq!(pair_value(&pairs, "_history"), Some("replace"));
        assert_eq!(pair_value(&pairs, "sort"), None);
    }

    #[test]
    fn backend_messages_reach_the_user() {
        let err = LoadError::new("Barang", BackendError::status(409, "Stok tidak cukup"));
        assert_eq!(failure_message("test", &err), "Stok tidak cukup");

        let err = LoadError::new("Barang", BackendError::Timeout);
        assert_eq!(failure_message("test", &err), "Server tidak merespons");
    }
}
