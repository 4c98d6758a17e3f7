use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri, header::REFERER},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    application::{
        admin::{
            stok::{STOK_PATH, StokBoardQuery, StokTarget},
        },
        backend::SubmitOutcome,
        forms::{FieldErrors, FormDraft},
    },
    presentation::{
        admin::views as admin_views,
        views::{render_html, render_template_response},
    },
};

use super::{
    AdminState,
    selectors::{MODAL_HOST, STOK_PANEL},
    shared::{
        Toast, bad_request, datastar_replace, error_page, finish_with_toasts, form_pairs,
        pair_value, panel_stream, render_modal, request_pairs, toast_failure,
    },
};

const ADD_FIELDS: [&str; 3] = ["jenis", "jumlah", "keterangan"];

fn parse_target(pairs: &[(String, String)], barang_id: Option<u64>) -> Option<StokTarget> {
    let barang_id = barang_id.or_else(|| pair_value(pairs, "barang_id")?.trim().parse().ok())?;
    let spesifikasi_id =
        pair_value(pairs, "spesifikasi_id").and_then(|raw| raw.trim().parse().ok());
    Some(StokTarget {
        barang_id,
        spesifikasi_id,
    })
}

/// Board state of the page the request came from.
fn referer_query(headers: &HeaderMap) -> StokBoardQuery {
    let referer = headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<Uri>().ok());
    match referer {
        Some(uri) => StokBoardQuery::from_pairs(request_pairs(&uri, &[])),
        None => StokBoardQuery::default(),
    }
}

pub(super) async fn admin_stok(State(state): State<AdminState>, uri: Uri) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_stok";
    let query = StokBoardQuery::from_pairs(request_pairs(&uri, &[]));
    if uri.query().is_some() && query.is_default() {
        return Redirect::to(STOK_PATH).into_response();
    }

    let chrome = state.chrome.load(STOK_PATH);
    let rows = match state.stok.load_rows().await {
        Ok(rows) => rows,
        Err(err) => return error_page(chrome, SOURCE, &err, "/"),
    };

    let content = state.stok.board_view(&rows, &query);
    let panel_html = match render_html(&admin_views::StokPanelTemplate { content }, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };
    let page = admin_views::AdminPanelPageView {
        heading: "Stok Barang".to_string(),
        panel_html,
        replace_location: None,
    };
    let view = admin_views::AdminLayout::new(chrome, page);
    render_template_response(admin_views::AdminPanelPageTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_stok_panel(
    State(state): State<AdminState>,
    uri: Uri,
    body: Bytes,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_stok_panel";
    let pairs = request_pairs(&uri, &body);
    let query = StokBoardQuery::from_pairs(pairs.clone());

    match board_html(&state, &query, SOURCE).await {
        Ok(html) => panel_stream(STOK_PANEL, &pairs, html, &query.href()).into_response(),
        Err(response) => response,
    }
}

async fn board_html(
    state: &AdminState,
    query: &StokBoardQuery,
    source: &'static str,
) -> Result<String, Response> {
    let rows = state
        .stok
        .load_rows()
        .await
        .map_err(|err| toast_failure(source, &err))?;
    let content = state.stok.board_view(&rows, query);
    render_html(&admin_views::StokPanelTemplate { content }, source)
        .map_err(IntoResponse::into_response)
}

/// Movement history of one item. A failed lookup only raises an error toast.
pub(super) async fn admin_stok_transactions(
    State(state): State<AdminState>,
    Path(barang_id): Path<u64>,
    uri: Uri,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_stok_transactions";
    let pairs = request_pairs(&uri, &[]);
    let Some(target) = parse_target(&pairs, Some(barang_id)) else {
        return bad_request(SOURCE, "missing barang_id");
    };
    let label = pair_value(&pairs, "label").unwrap_or_default().trim();

    let transactions = match state.stok.transactions(target).await {
        Ok(transactions) => transactions,
        Err(err) => return toast_failure(SOURCE, &err),
    };
    let content = state.stok.transactions_view(label, &transactions);
    render_modal(&admin_views::StokTransactionsModalTemplate { content }, SOURCE)
}

pub(super) async fn admin_stok_add_modal(State(state): State<AdminState>, uri: Uri) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_stok_add_modal";
    let pairs = request_pairs(&uri, &[]);
    let Some(target) = parse_target(&pairs, None) else {
        return bad_request(SOURCE, "missing barang_id");
    };
    let draft = FormDraft::new().with("jenis", "masuk").with("jumlah", "1");
    let content = state
        .stok
        .add_modal_view(target, &draft, &FieldErrors::new());
    render_modal(&admin_views::StokAddModalTemplate { content }, SOURCE)
}

pub(super) async fn admin_stok_add(
    State(state): State<AdminState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    const SOURCE: &str = "infra::http::admin::admin_stok_add";
    let pairs = form_pairs(&body);
    let Some(target) = parse_target(&pairs, None) else {
        return bad_request(SOURCE, "missing barang_id");
    };
    let mut draft = FormDraft::new();
    for field in ADD_FIELDS {
        draft.set(field, pair_value(&pairs, field).unwrap_or_default());
    }

    match state.stok.add_stock(target, &draft).await {
        Ok(SubmitOutcome::Accepted { message }) => {
            let query = referer_query(&headers);
            let mut stream = match board_html(&state, &query, SOURCE).await {
                Ok(html) => datastar_replace(STOK_PANEL, html),
                Err(response) => return response,
            };
            stream.push_clear(MODAL_HOST);
            let text = message.unwrap_or_else(|| "Stok berhasil ditambahkan.".to_string());
            finish_with_toasts(stream, &[Toast::success(text)])
        }
        Ok(SubmitOutcome::Rejected(errors)) => {
            let content = state.stok.add_modal_view(target, &draft, &errors);
            render_modal(&admin_views::StokAddModalTemplate { content }, SOURCE)
        }
        Err(err) => toast_failure(SOURCE, &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn targets_need_an_item() {
        let pairs = vec![("spesifikasi_id".to_string(), "4".to_string())];
        assert_eq!(parse_target(&pairs, None), None);
        assert_eq!(
            parse_target(&pairs, Some(2)),
            Some(StokTarget {
                barang_id: 2,
                spesifikasi_id: Some(4)
            })
        );
    }

    #[test]
    fn board_state_comes_from_the_referer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_static("http://localhost:3000/stok?search=spidol&sort=stok_desc"),
        );
        let query = referer_query(&headers);
        assert_eq!(query.search, "spidol");
        assert_eq!(query.href(), "/stok?search=spidol&sort=stok_desc");
        assert!(referer_query(&HeaderMap::new()).is_default());
    }
}
