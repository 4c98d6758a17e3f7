use std::time::Duration;

use httpmock::MockServer;
use sekretariat::{
    application::{
        backend::{BackendError, BackendGateway, FormMethod, SubmitOutcome},
        uploads::MultipartBody,
    },
    config::BackendSettings,
    infra::backend::HttpBackend,
};
use url::Url;

fn backend(server: &MockServer, token: Option<&str>) -> HttpBackend {
    let settings = BackendSettings {
        base_url: Url::parse(&server.base_url()).expect("mock url"),
        token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
    };
    HttpBackend::new(&settings).expect("client")
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[tokio::test]
async fn page_props_requests_carry_json_headers_and_the_list_state() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/barang")
            .header("accept", "application/json")
            .header("x-requested-with", "XMLHttpRequest")
            .header("authorization", "Bearer rahasia")
            .query_param("search", "kursi")
            .query_param("page", "2");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"component":"Barang/Index","props":{"barang":{"data":[],"current_page":"2","last_page":2,"per_page":10,"total":"11"}}}"#);
    });

    let backend = backend(&server, Some("rahasia"));
    let props = backend
        .fetch_props("/barang", &params(&[("search", "kursi"), ("page", "2")]))
        .await
        .expect("props");

    mock.assert();
    assert!(props.get("barang").is_some());
    assert!(props.get("component").is_none());
}

#[tokio::test]
async fn validation_failures_come_back_as_field_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/barang/3");
        then.status(422)
            .header("content-type", "application/json")
            .body(r#"{"message":"Data tidak valid.","errors":{"nama":["Nama wajib diisi."],"jumlah":["Jumlah minimal 1.","Jumlah harus angka."]}}"#);
    });

    let backend = backend(&server, None);
    let body = MultipartBody::new().text("nama", "").text("jumlah", "0");
    let outcome = backend
        .submit(FormMethod::Put, "/barang/3", body)
        .await
        .expect("outcome");

    mock.assert();
    let SubmitOutcome::Rejected(errors) = outcome else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert_eq!(errors.first("nama"), Some("Nama wajib diisi."));
    assert_eq!(errors.first("jumlah"), Some("Jumlah minimal 1."));
}

#[tokio::test]
async fn accepted_mutations_surface_the_backend_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("DELETE").path("/pelanggan/9");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"message":"Pelanggan dihapus."}"#);
    });

    let backend = backend(&server, None);
    let outcome = backend.delete("/pelanggan/9").await.expect("outcome");

    mock.assert();
    assert_eq!(
        outcome,
        SubmitOutcome::Accepted {
            message: Some("Pelanggan dihapus.".to_string())
        }
    );
}

#[tokio::test]
async fn server_errors_keep_status_and_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/stok/4/transactions");
        then.status(500)
            .header("content-type", "application/json")
            .body(r#"{"message":"Server Error"}"#);
    });

    let backend = backend(&server, None);
    let err = backend
        .fetch_json("/stok/4/transactions", &params(&[("spesifikasi_id", "2")]))
        .await
        .expect_err("status error");

    match err {
        BackendError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Server Error");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn public_urls_keep_export_queries() {
    let server = MockServer::start();
    let backend = backend(&server, None);
    assert_eq!(
        backend.public_url("/export/excel?format=csv"),
        format!("{}/export/excel?format=csv", server.base_url())
    );
    assert_eq!(
        backend.public_url("/storage/barang/kursi.png"),
        format!("{}/storage/barang/kursi.png", server.base_url())
    );
}
