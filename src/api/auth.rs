use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::paths::{self, PathValidation};
use crate::proxy::upstream;
use crate::AppState;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// GET /api/auth/google/url — build the OAuth consent URL for Drive
/// access.
pub async fn google_auth_url(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let client_id = state
        .config
        .google_client_id
        .as_deref()
        .ok_or(AppError::MissingCredential("GOOGLE_CLIENT_ID"))?;
    let redirect_uri = state
        .config
        .google_redirect_uri
        .as_deref()
        .ok_or(AppError::MissingCredential("GOOGLE_REDIRECT_URI"))?;

    let mut url = url::Url::parse(GOOGLE_AUTH_URL).context("auth endpoint url")?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", DRIVE_SCOPE)
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");

    Ok(Json(AuthUrlResponse {
        url: url.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    pub code: String,
}

/// POST /api/auth/google/token — exchange an authorization code for
/// tokens and relay Google's response verbatim.
pub async fn exchange_google_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExchangeRequest>,
) -> Result<Response, AppError> {
    let client_id = state
        .config
        .google_client_id
        .as_deref()
        .ok_or(AppError::MissingCredential("GOOGLE_CLIENT_ID"))?;
    let client_secret = state
        .config
        .google_client_secret
        .as_deref()
        .ok_or(AppError::MissingCredential("GOOGLE_CLIENT_SECRET"))?;
    let redirect_uri = state
        .config
        .google_redirect_uri
        .as_deref()
        .ok_or(AppError::MissingCredential("GOOGLE_REDIRECT_URI"))?;

    let params = [
        ("code", payload.code.as_str()),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];

    let resp = state.upstream.send_form(GOOGLE_TOKEN_URL, &params).await?;
    Ok(upstream::relay(resp))
}

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub path: String,
}

/// GET /api/auth/validate-path — classify a frontend route for the
/// client-side guard.
pub async fn validate_path(Query(query): Query<ValidateQuery>) -> Json<PathValidation> {
    Json(paths::validate_path(&query.path))
}
