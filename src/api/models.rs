use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;

use crate::errors::AppError;
use crate::proxy::upstream;
use crate::AppState;

/// GET /api/models — relay OpenRouter's model catalog.
///
/// The catalog endpoint works without a key; one is attached when
/// configured so account-scoped listings come back.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = &state.config.openrouter_api_key {
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .context("OPENROUTER_API_KEY contains invalid header characters")?,
        );
    }

    let url = format!("{}/api/v1/models", state.config.openrouter_base_url);
    let resp = state.upstream.get(&url, headers).await?;
    Ok(upstream::relay(resp))
}
