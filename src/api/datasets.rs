use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::upstream;
use crate::AppState;

const GITHUB_API: &str = "https://api.github.com";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
pub struct GithubQuery {
    /// Repository in owner/name form.
    pub repo: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub content: String,
}

/// GET /api/datasets/github — list a repository directory via the
/// GitHub contents API.
pub async fn list_github(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GithubQuery>,
) -> Result<Response, AppError> {
    let url = contents_url(&query)?;
    let resp = state
        .upstream
        .get(url.as_str(), github_headers(&state)?)
        .await?;
    Ok(upstream::relay(resp))
}

/// GET /api/datasets/github/file — fetch one file and decode its
/// base64 payload.
pub async fn fetch_github_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GithubQuery>,
) -> Result<Json<DatasetFile>, AppError> {
    let url = contents_url(&query)?;
    let resp = state
        .upstream
        .get(url.as_str(), github_headers(&state)?)
        .await?;

    let status = resp.status();
    if status == axum::http::StatusCode::NOT_FOUND {
        return Err(AppError::NotFound);
    }
    if !status.is_success() {
        return Err(AppError::Upstream(format!("github responded {status}")));
    }

    let doc: Value = resp
        .json()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    let encoded = doc
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidRequest("path does not point to a file".into()))?;

    // GitHub wraps base64 content at 60 columns.
    let raw = BASE64
        .decode(encoded.replace(['\n', '\r'], ""))
        .map_err(|e| AppError::Upstream(format!("invalid base64 content: {e}")))?;

    Ok(Json(DatasetFile {
        name: doc["name"].as_str().unwrap_or_default().to_string(),
        path: doc["path"].as_str().unwrap_or_default().to_string(),
        size: doc["size"].as_u64().unwrap_or(0),
        content: String::from_utf8_lossy(&raw).into_owned(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DriveQuery {
    pub folder_id: Option<String>,
}

/// GET /api/datasets/drive — list Drive files using the caller's OAuth
/// access token from the `x-google-access-token` header.
pub async fn list_drive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DriveQuery>,
) -> Result<Response, AppError> {
    let token = headers
        .get("x-google-access-token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::InvalidRequest("x-google-access-token header is required".into())
        })?;

    let mut url = url::Url::parse(DRIVE_API).context("drive api url")?;
    url.query_pairs_mut()
        .append_pair("fields", "files(id,name,mimeType,size,modifiedTime)")
        .append_pair("pageSize", "100");
    if let Some(folder) = &query.folder_id {
        url.query_pairs_mut()
            .append_pair("q", &format!("'{folder}' in parents"));
    }

    let mut upstream_headers = HeaderMap::new();
    upstream_headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AppError::InvalidRequest("malformed access token".into()))?,
    );

    let resp = state.upstream.get(url.as_str(), upstream_headers).await?;
    Ok(upstream::relay(resp))
}

fn contents_url(query: &GithubQuery) -> Result<url::Url, AppError> {
    let mut parts = query.repo.split('/');
    let (owner, name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => (owner, name),
        _ => {
            return Err(AppError::InvalidRequest(
                "repo must be in owner/name form".into(),
            ))
        }
    };

    let mut url = url::Url::parse(&format!(
        "{GITHUB_API}/repos/{owner}/{name}/contents/{}",
        query.path
    ))
    .map_err(|_| AppError::InvalidRequest("invalid repository path".into()))?;
    if let Some(git_ref) = &query.git_ref {
        url.query_pairs_mut().append_pair("ref", git_ref);
    }
    Ok(url)
}

fn github_headers(state: &AppState) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(header::USER_AGENT, HeaderValue::from_static("timeai"));
    if let Some(token) = &state.config.github_token {
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .context("GITHUB_TOKEN contains invalid header characters")?,
        );
    }
    Ok(headers)
}
