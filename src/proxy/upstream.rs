//! HTTP client for forwarding requests to upstream provider APIs.
//! Uses reqwest-middleware for retries and tracing.

use std::time::Duration;

use anyhow::Context;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use reqwest::header::HeaderMap;
use reqwest::Method;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::errors::AppError;

pub struct UpstreamClient {
    client: ClientWithMiddleware,
}

impl UpstreamClient {
    pub fn new() -> Self {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(32)
            .timeout(Duration::from_secs(60)) // Total timeout including retries
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");

        // Exponential backoff, 3 retries on transient failures.
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(reqwest_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client }
    }

    /// GET an upstream endpoint. Non-2xx statuses are not errors; the
    /// caller decides whether to relay or inspect them.
    pub async fn get(&self, url: &str, headers: HeaderMap) -> Result<reqwest::Response, AppError> {
        self.client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("upstream request failed after retries: {}", e);
                AppError::Upstream(e.to_string())
            })
    }

    /// Forward a JSON payload to an upstream endpoint.
    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, AppError> {
        let payload = serde_json::to_vec(body).context("failed to serialize upstream payload")?;
        self.client
            .request(method, url)
            .headers(headers)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("upstream request failed after retries: {}", e);
                AppError::Upstream(e.to_string())
            })
    }

    /// POST a form-encoded payload (OAuth token endpoints).
    pub async fn send_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, AppError> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        self.client
            .post(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encoded)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("upstream request failed after retries: {}", e);
                AppError::Upstream(e.to_string())
            })
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn an upstream response into a client-facing one, streaming the
/// body through so SSE chat completions pass untouched. Only the
/// status and content type are relayed; hop-by-hop headers are not.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    if let Some(ct) = upstream.headers().get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, ct.clone());
    }
    let body = upstream.bytes_stream().map_err(std::io::Error::other);
    builder
        .body(Body::from_stream(body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
