use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod auth;
pub mod chat;
pub mod datasets;
pub mod models;
pub mod subscriptions;

/// Build the API router. All routes are relative — the caller mounts
/// this under `/api`.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat::complete))
        .route("/chat-with-tools", post(chat::complete_with_tools))
        .route("/models", get(models::list_models))
        .route("/datasets/github", get(datasets::list_github))
        .route("/datasets/github/file", get(datasets::fetch_github_file))
        .route("/datasets/drive", get(datasets::list_drive))
        .route("/auth/google/url", get(auth::google_auth_url))
        .route("/auth/google/token", post(auth::exchange_google_code))
        .route("/auth/validate-path", get(auth::validate_path))
        .route("/subscriptions/plans", get(subscriptions::list_plans))
        .route("/subscriptions/plans/:id", get(subscriptions::get_plan))
        .route(
            "/subscriptions/usage/:user_id",
            get(subscriptions::usage_stats),
        )
        .route(
            "/subscriptions/usage/:user_id/increment",
            post(subscriptions::increment_usage),
        )
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    env: String,
    uptime_secs: u64,
    pending_requests: usize,
}

/// GET /api/health — liveness probe plus a couple of cheap gauges.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        env: state.config.env.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        pending_requests: state.tracker.pending_count(),
    })
}
