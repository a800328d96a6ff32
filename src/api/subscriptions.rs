use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::plan::{seed_plans, PlanConfig};
use crate::models::usage::{UsageStats, UserRequestCount};
use crate::AppState;

/// GET /api/subscriptions/plans — every active subscription tier.
pub async fn list_plans() -> Json<Vec<PlanConfig>> {
    Json(seed_plans().into_iter().filter(|p| p.is_active).collect())
}

/// GET /api/subscriptions/plans/:id — one tier by plan id.
pub async fn get_plan(Path(id): Path<String>) -> Result<Json<PlanConfig>, AppError> {
    seed_plans()
        .into_iter()
        .find(|p| p.plan_id == id)
        .map(Json)
        .ok_or(AppError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    pub days: Option<u32>,
}

/// GET /api/subscriptions/usage/:user_id — aggregate usage for a user.
pub async fn usage_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<UsageQuery>,
) -> Json<UsageStats> {
    Json(
        state
            .tracker
            .user_usage_stats(&user_id, query.days.unwrap_or(30)),
    )
}

/// POST /api/subscriptions/usage/:user_id/increment — count a request
/// against a user.
pub async fn increment_usage(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<UserRequestCount> {
    Json(state.tracker.increment_user_requests(&user_id))
}
