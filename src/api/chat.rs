use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use axum::Json;
use reqwest::Method;
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::upstream;
use crate::AppState;

/// POST /api/chat — forward a chat-completion request to OpenRouter.
///
/// The payload passes through untouched; streaming responses are
/// relayed as they arrive.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    forward_completion(&state, &headers, payload).await
}

/// POST /api/chat-with-tools — same as `/chat`, but the payload must
/// carry a non-empty `tools` array for function calling.
pub async fn complete_with_tools(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Response, AppError> {
    let has_tools = payload
        .get("tools")
        .and_then(Value::as_array)
        .is_some_and(|tools| !tools.is_empty());
    if !has_tools {
        return Err(AppError::InvalidRequest(
            "a non-empty tools array is required".into(),
        ));
    }
    forward_completion(&state, &headers, payload).await
}

async fn forward_completion(
    state: &AppState,
    headers: &HeaderMap,
    payload: Value,
) -> Result<Response, AppError> {
    let key = state
        .config
        .openrouter_api_key
        .as_deref()
        .ok_or(AppError::MissingCredential("OPENROUTER_API_KEY"))?;

    if let Some(user) = headers.get("x-user-id").and_then(|v| v.to_str().ok()) {
        state.tracker.increment_user_requests(user);
    }

    let mut upstream_headers = HeaderMap::new();
    upstream_headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {key}"))
            .context("OPENROUTER_API_KEY contains invalid header characters")?,
    );
    upstream_headers.insert("http-referer", HeaderValue::from_static("https://timeai.app"));
    upstream_headers.insert("x-title", HeaderValue::from_static("Time AI"));

    let url = format!(
        "{}/api/v1/chat/completions",
        state.config.openrouter_base_url
    );
    let resp = state
        .upstream
        .send_json(Method::POST, &url, upstream_headers, &payload)
        .await?;
    Ok(upstream::relay(resp))
}
