use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of per-user usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub requests: u64,
    pub tokens: u64,
}

/// Aggregate usage for one user over a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub user_id: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_tokens: u64,
    pub daily: Vec<DailyUsage>,
}

/// Returned after counting a request against a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequestCount {
    pub requests_used: u64,
}
