//! reqwest implementation of [`BackendGateway`].

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{
    Client, Method, RequestBuilder, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue},
    multipart::{Form, Part},
};
use tracing::{debug, warn};

use crate::application::{
    backend::{BackendError, BackendGateway, FormMethod, PageProps, SubmitOutcome},
    forms::FieldErrors,
    uploads::{MultipartBody, MultipartPart},
};
use crate::config::BackendSettings;
use crate::infra::error::InfraError;

use super::{METRIC_BACKEND_REQUEST_MS, METRIC_BACKEND_REQUESTS_TOTAL};

const TARGET: &str = "sekretariat::infra::backend";
const REQUESTED_WITH: &str = "X-Requested-With";

/// Talks to the backend over HTTP with JSON in and JSON or multipart out.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        if let Some(token) = settings.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| InfraError::configuration(format!("backend token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(concat!("sekretariat/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            base: normalize_base(settings.base_url.clone()),
        })
    }

    fn url(&self, path: &str, params: &[(String, String)]) -> Result<Url, BackendError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|err| BackendError::Url(format!("{path}: {err}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<(StatusCode, bytes::Bytes), BackendError> {
        let started = Instant::now();
        let result = async {
            let response = request.send().await.map_err(transport_error)?;
            let status = response.status();
            let body = response.bytes().await.map_err(transport_error)?;
            Ok::<_, BackendError>((status, body))
        }
        .await;

        let outcome = match &result {
            Ok((status, _)) if status.is_success() => "ok",
            Ok((status, _)) if *status == StatusCode::UNPROCESSABLE_ENTITY => "rejected",
            Ok(_) => "error",
            Err(BackendError::Timeout) => "timeout",
            Err(_) => "transport",
        };
        counter!(METRIC_BACKEND_REQUESTS_TOTAL, "method" => method, "outcome" => outcome)
            .increment(1);
        histogram!(METRIC_BACKEND_REQUEST_MS, "method" => method)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok((status, _)) => debug!(
                target = TARGET,
                method,
                path,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "backend request finished"
            ),
            Err(err) => warn!(
                target = TARGET,
                method,
                path,
                error = %err,
                "backend request failed"
            ),
        }
        result
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, BackendError> {
        let url = self.url(path, params)?;
        let (status, body) = self.send(self.client.get(url), "GET", path).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(BackendError::decode)
    }

    async fn mutate(
        &self,
        request: RequestBuilder,
        method: &'static str,
        path: &str,
    ) -> Result<SubmitOutcome, BackendError> {
        let (status, body) = self.send(request, method, path).await?;
        submit_outcome(status, &body)
    }
}

/// Joining relative paths needs a trailing slash on the base.
fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> BackendError {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    BackendError::status(status.as_u16(), message)
}

/// Page responses may arrive wrapped in a `{component, props}` envelope.
fn unwrap_props(value: serde_json::Value) -> PageProps {
    match value {
        serde_json::Value::Object(mut object)
            if object.contains_key("component") && object.contains_key("props") =>
        {
            PageProps::new(object.remove("props").unwrap_or_default())
        }
        other => PageProps::new(other),
    }
}

fn submit_outcome(status: StatusCode, body: &[u8]) -> Result<SubmitOutcome, BackendError> {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        let payload: serde_json::Value =
            serde_json::from_slice(body).map_err(BackendError::decode)?;
        return Ok(SubmitOutcome::Rejected(FieldErrors::from_validation_payload(
            &payload,
        )));
    }
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .or_else(|| payload.pointer("/flash/success"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });
    Ok(SubmitOutcome::Accepted { message })
}

fn multipart_form(body: MultipartBody) -> Result<Form, BackendError> {
    let mut form = Form::new();
    for part in body.into_parts() {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|err| BackendError::Transport(err.to_string()))?;
                form.part(file.field, part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl BackendGateway for HttpBackend {
    async fn fetch_props(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<PageProps, BackendError> {
        self.get_json(path, params).await.map(unwrap_props)
    }

    async fn fetch_json(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, BackendError> {
        self.get_json(path, params).await
    }

    async fn submit(
        &self,
        method: FormMethod,
        path: &str,
        body: MultipartBody,
    ) -> Result<SubmitOutcome, BackendError> {
        let url = self.url(path, &[])?;
        let form = multipart_form(body.with_method_override(method))?;
        self.mutate(self.client.post(url).multipart(form), "POST", path)
            .await
    }

    async fn submit_json(
        &self,
        method: FormMethod,
        path: &str,
        body: serde_json::Value,
    ) -> Result<SubmitOutcome, BackendError> {
        let url = self.url(path, &[])?;
        let (verb, label) = match method {
            FormMethod::Post => (Method::POST, "POST"),
            FormMethod::Put => (Method::PUT, "PUT"),
            FormMethod::Patch => (Method::PATCH, "PATCH"),
        };
        self.mutate(self.client.request(verb, url).json(&body), label, path)
            .await
    }

    async fn delete(&self, path: &str) -> Result<SubmitOutcome, BackendError> {
        let url = self.url(path, &[])?;
        self.mutate(self.client.delete(url), "DELETE", path).await
    }

    fn public_url(&self, path: &str) -> String {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        match self.base.join(path.trim_start_matches('/')) {
            Ok(mut url) => {
                url.set_query(query);
                url.to_string()
            }
            Err(_) => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_gains_a_trailing_slash() {
        let base = normalize_base(Url::parse("https://sekolah.example/api?x=1").expect("url"));
        assert_eq!(base.as_str(), "https://sekolah.example/api/");
    }

    #[test]
    fn validation_responses_become_field_errors() {
        let body = json!({
            "message": "Data tidak valid",
            "errors": {"nama": ["Nama wajib diisi"]}
        })
        .to_string();
        let outcome =
            submit_outcome(StatusCode::UNPROCESSABLE_ENTITY, body.as_bytes()).expect("outcome");
        match outcome {
            SubmitOutcome::Rejected(errors) => {
                assert_eq!(errors.first("nama"), Some("Nama wajib diisi"));
                assert_eq!(errors.summary(), Some("Data tidak valid"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn server_errors_keep_the_backend_message() {
        let body = json!({"message": "Stok tidak cukup"}).to_string();
        let err = submit_outcome(StatusCode::CONFLICT, body.as_bytes()).expect_err("error");
        assert!(matches!(
            err,
            BackendError::Status { status: 409, ref message } if message == "Stok tidak cukup"
        ));

        let err = status_error(StatusCode::BAD_GATEWAY, b"<html>");
        assert!(matches!(err, BackendError::Status { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[test]
    fn envelopes_are_unwrapped() {
        let props = unwrap_props(json!({"component": "Barang/Index", "props": {"barang": []}}));
        assert!(props.get("barang").is_some());
        let bare = unwrap_props(json!({"barang": []}));
        assert!(bare.get("barang").is_some());
    }

    #[test]
    fn accepted_messages_are_read_from_flash() {
        let body = json!({"flash": {"success": "Tersimpan"}}).to_string();
        let outcome = submit_outcome(StatusCode::OK, body.as_bytes()).expect("outcome");
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                message: Some("Tersimpan".to_string())
            }
        );
        assert!(submit_outcome(StatusCode::NO_CONTENT, b"").expect("outcome").is_accepted());
    }
}
