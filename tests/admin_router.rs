use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use sekretariat::{
    application::{
        admin::{AdminChromeService, AdminUiSettings},
        backend::{BackendError, BackendGateway, FormMethod, PageProps, SubmitOutcome},
        uploads::{MultipartBody, PreviewRegistry},
    },
    infra::http::{AdminState, build_admin_router},
};

/// Backend double answering page routes from canned props. Unknown paths
/// come back as 404.
#[derive(Default)]
struct StubBackend {
    pages: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl StubBackend {
    fn with_page(mut self, path: &str, props: Value) -> Self {
        self.pages.insert(path.to_string(), props);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn encode(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl BackendGateway for StubBackend {
    async fn fetch_props(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<PageProps, BackendError> {
        self.record(format!("GET {path}?{}", encode(params)));
        self.pages
            .get(path)
            .cloned()
            .map(PageProps::new)
            .ok_or_else(|| BackendError::status(404, ""))
    }

    async fn fetch_json(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, BackendError> {
        self.record(format!("GET {path}?{}", encode(params)));
        Err(BackendError::status(404, ""))
    }

    async fn submit(
        &self,
        _method: FormMethod,
        path: &str,
        _body: MultipartBody,
    ) -> Result<SubmitOutcome, BackendError> {
        self.record(format!("SUBMIT {path}"));
        Ok(SubmitOutcome::Accepted { message: None })
    }

    async fn submit_json(
        &self,
        _method: FormMethod,
        path: &str,
        _body: Value,
    ) -> Result<SubmitOutcome, BackendError> {
        self.record(format!("SUBMIT {path}"));
        Ok(SubmitOutcome::Accepted { message: None })
    }

    async fn delete(&self, path: &str) -> Result<SubmitOutcome, BackendError> {
        self.record(format!("DELETE {path}"));
        Ok(SubmitOutcome::Accepted {
            message: Some("Barang dihapus.".to_string()),
        })
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://backend.test{path}")
    }
}

fn barang_props() -> Value {
    json!({
        "barang": {
            "data": [{"id": 7, "kode": "BRG-007", "nama": "Kursi Lipat", "jumlah": 5}],
            "current_page": 1,
            "last_page": 1,
            "per_page": 10,
            "total": 1
        }
    })
}

fn router(backend: StubBackend) -> (Router, std::sync::Arc<StubBackend>) {
    let backend = std::sync::Arc::new(backend);
    let state = AdminState::new(
        backend.clone(),
        AdminChromeService::new("Sekretariat", "/datastar.js"),
        AdminUiSettings::default(),
        PreviewRegistry::new(),
        1 << 20,
    );
    (build_admin_router(state), backend)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_without_touching_the_backend() {
    let (router, backend) = router(StubBackend::default());
    let (status, _, body) = send(router, get("/_health")).await;

    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["status"], "ok");
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn default_list_queries_redirect_to_the_bare_path() {
    let (router, backend) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (status, headers, _) = send(router, get("/barang?page=1&sort_by=created_at")).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/barang");
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn list_page_renders_backend_records() {
    let (router, backend) = router(StubBackend::default().with_page("/barang", barang_props()));
    let request = Request::builder()
        .uri("/barang")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-request-id"], "req-42");
    assert!(body.contains("Kursi Lipat"));
    assert!(body.contains("data-admin-panel=\"barang\""));

    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("GET /barang?"));
    assert!(calls[0].contains("page=1"));
}

#[tokio::test]
async fn flash_toasts_clean_the_address_bar() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (status, _, body) = send(router, get("/barang?flash=created")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Barang berhasil ditambahkan."));
    assert!(body.contains("data-replace-location="));
}

#[tokio::test]
async fn panel_refresh_streams_the_panel_and_pushes_history() {
    let (router, backend) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (status, headers, body) = send(router, post_form("/barang/panel", "search=kursi")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert!(body.contains("datastar-patch-elements"));
    assert!(body.contains("Kursi Lipat"));
    assert!(body.contains("pushState"));
    assert!(body.contains("search=kursi"));

    let calls = backend.calls.lock().unwrap();
    assert!(calls[0].contains("search=kursi"));
}

#[tokio::test]
async fn replace_visits_rewrite_history_in_place() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (_, _, body) = send(
        router,
        post_form("/barang/panel", "search=kursi&_history=replace"),
    )
    .await;

    assert!(body.contains("replaceState"));
    assert!(!body.contains("pushState"));
}

#[tokio::test]
async fn ticketed_panel_requests_only_answer_their_own_ticket() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (status, _, body) = send(
        router,
        post_form("/barang/panel?_seq=5", "search=kursi"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("[data-admin-panel=\"barang\"][data-panel-ticket=\"5\"]"));
    assert!(body.contains("if (document.querySelector("));
    assert!(!body.contains("data-panel-ticket=\"4\""));
}

#[tokio::test]
async fn untrusted_tickets_fall_back_to_the_whole_panel() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (_, _, body) = send(router, post_form("/barang/panel?_seq=zero", "")).await;

    assert!(body.contains("datastar-patch-elements"));
    assert!(!body.contains("data-panel-ticket"));
}

#[tokio::test]
async fn list_toolbar_offers_sort_and_export_menus() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (_, _, body) = send(router, get("/barang")).await;

    assert!(body.contains("data-dropdown=\"sort\""));
    assert!(body.contains("data-dropdown=\"export\""));
    assert!(body.contains("data-on:click__outside=\"$menuExport = false\""));
    assert!(body.contains("data-show=\"$menuSort\""));
    assert!(body.contains("adminPanelRequest(el, "));
}

#[tokio::test]
async fn search_input_remembers_the_applied_term() {
    let (router, _) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (_, _, body) = send(router, get("/barang?search=kursi")).await;

    assert!(body.contains("data-applied=\"kursi\""));
    assert!(body.contains("el.value.trim() !== el.dataset.applied &&"));
}

#[tokio::test]
async fn deleting_a_record_refreshes_the_panel_with_a_toast() {
    let (router, backend) = router(StubBackend::default().with_page("/barang", barang_props()));
    let (status, _, body) = send(router, post_form("/barang/7/delete", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Barang dihapus."));
    assert!(body.contains("replaceState"));

    let calls = backend.calls.lock().unwrap();
    assert_eq!(calls[0], "DELETE /barang/7");
    assert!(calls[1].starts_with("GET /barang?"));
}

#[tokio::test]
async fn missing_backend_pages_render_a_not_found_page() {
    let (router, _) = router(StubBackend::default());
    let (status, headers, body) = send(router, get("/pelanggan")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers.contains_key("x-request-id"));
    assert!(body.contains("Data tidak ditemukan"));
}

#[tokio::test]
async fn failed_panel_refreshes_only_raise_a_toast() {
    let (router, _) = router(StubBackend::default());
    let (status, _, body) = send(router, post_form("/pelanggan/panel", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-admin-toast"));
    assert!(!body.contains("pushState"));
}

#[tokio::test]
async fn client_toasts_accept_known_kinds_only() {
    let (router_ok, _) = router(StubBackend::default());
    let (status, _, body) = send(
        router_ok,
        post_form("/toasts", "kind=success&message=Tersalin"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Tersalin"));

    let (router_bad, _) = router(StubBackend::default());
    let (status, _, _) = send(router_bad, post_form("/toasts", "kind=info&message=x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_and_export_links_point_at_the_backend() {
    let (router_storage, _) = router(StubBackend::default());
    let (status, headers, _) = send(router_storage, get("/storage/barang/kursi.png")).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        headers[header::LOCATION],
        "http://backend.test/storage/barang/kursi.png"
    );

    let (router_export, _) = router(StubBackend::default());
    let (status, _, _) = send(router_export, get("/export/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_paths_cannot_climb_out() {
    let (router, _) = router(StubBackend::default());
    let (status, _, _) = send(router, get("/storage/barang/../secret")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_recap_scopes_are_rejected() {
    let (router, backend) = router(StubBackend::default());
    let (status, _, _) = send(router, get("/kehadiran/rekap/tahunan")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_previews_are_not_found() {
    let (router, _) = router(StubBackend::default());
    let (status, _, _) = send(router, get("/previews/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_assets_are_served_with_their_mime_type() {
    let (router, _) = router(StubBackend::default());
    let (status, headers, body) = send(router, get("/static/admin/app.css")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
    assert!(!body.is_empty());
}
