//! In-memory request usage tracking.
//!
//! The tracker is an explicitly constructed service owned by the server
//! state and shared with the [`track`] middleware layer, which times
//! every request and logs completion after the inner handler has
//! produced its response.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::middleware::metrics;
use crate::models::usage::{DailyUsage, UsageStats, UserRequestCount};

/// Length of generated request identifiers.
const REQUEST_ID_LEN: usize = 9;

/// Completion details recorded for a request.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RequestRecord {
    pub method: String,
    pub path: String,
    pub status: u16,
    pub user_id: Option<String>,
    pub tokens: Option<u64>,
}

/// Outcome of a tracking operation.
///
/// Internal failures are folded into the payload instead of propagating
/// to the request path; the in-memory tracker has no failure mode that
/// sets `error`, but the field stays on the wire shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

pub struct UsageTracker {
    pending: DashMap<String, Instant>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
        }
    }

    /// Generate a short random alphanumeric request identifier.
    pub fn next_request_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REQUEST_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Record the start time for `id`.
    pub fn start_request(&self, id: &str) {
        self.pending.insert(id.to_string(), Instant::now());
    }

    /// Finish timing for `id` and emit the completion log line.
    ///
    /// An unknown id is not an error: elapsed time defaults to zero.
    /// The pending entry, if any, is removed.
    pub fn track_request(&self, id: &str, record: &RequestRecord) -> TrackOutcome {
        let elapsed_ms = self
            .pending
            .remove(id)
            .map(|(_, started)| started.elapsed().as_millis() as u64)
            .unwrap_or(0);

        tracing::info!(
            request_id = id,
            method = %record.method,
            path = %record.path,
            status = record.status,
            user_id = record.user_id.as_deref().unwrap_or("-"),
            response_time_ms = elapsed_ms,
            "request tracked"
        );

        metrics::record(record, elapsed_ms);

        TrackOutcome {
            success: true,
            error: None,
            response_time_ms: Some(elapsed_ms),
        }
    }

    /// Count a request against a user.
    ///
    /// There is no backing store yet; callers only observe the
    /// fabricated single-request count.
    pub fn increment_user_requests(&self, user_id: &str) -> UserRequestCount {
        tracing::debug!(user_id, "user request counted");
        UserRequestCount { requests_used: 1 }
    }

    /// Aggregate usage for a user over the trailing `days` window.
    ///
    /// Returns zeroed aggregates until a backing store exists; the
    /// per-day breakdown is shaped but empty of data.
    pub fn user_usage_stats(&self, user_id: &str, days: u32) -> UsageStats {
        let today = Utc::now().date_naive();
        let daily = (0..days)
            .map(|offset| DailyUsage {
                date: today - chrono::Duration::days(i64::from(offset)),
                requests: 0,
                tokens: 0,
            })
            .collect();

        UsageStats {
            user_id: user_id.to_string(),
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            total_tokens: 0,
            daily,
        }
    }

    /// Number of requests currently in flight (started, not yet tracked).
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware: assigns a random request id, times the request, and logs
/// completion once the inner handler has produced its response. The id
/// is stamped on the response as `x-request-id`.
pub async fn track(
    State(tracker): State<Arc<UsageTracker>>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = UsageTracker::next_request_id();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    tracker.start_request(&request_id);

    let mut resp = next.run(req).await;

    let record = RequestRecord {
        method,
        path,
        status: resp.status().as_u16(),
        user_id: None,
        tokens: None,
    };
    tracker.track_request(&request_id, &record);

    if let Ok(val) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RequestRecord {
        RequestRecord {
            method: "GET".into(),
            path: "/api/health".into(),
            status: 200,
            ..Default::default()
        }
    }

    #[test]
    fn start_then_track_measures_elapsed() {
        let tracker = UsageTracker::new();
        tracker.start_request("abc123xyz");
        let outcome = tracker.track_request("abc123xyz", &record());
        assert!(outcome.success);
        assert!(outcome.response_time_ms.unwrap() < 1_000);
    }

    #[test]
    fn track_removes_the_pending_entry() {
        let tracker = UsageTracker::new();
        tracker.start_request("abc123xyz");
        assert_eq!(tracker.pending_count(), 1);
        tracker.track_request("abc123xyz", &record());
        assert_eq!(tracker.pending_count(), 0);
    }

    #[test]
    fn unknown_id_defaults_to_zero_elapsed() {
        let tracker = UsageTracker::new();
        let outcome = tracker.track_request("never-seen", &record());
        assert!(outcome.success);
        assert_eq!(outcome.response_time_ms, Some(0));

        // Tracking the same id twice behaves the same way.
        tracker.start_request("once");
        tracker.track_request("once", &record());
        let again = tracker.track_request("once", &record());
        assert!(again.success);
        assert_eq!(again.response_time_ms, Some(0));
    }

    #[test]
    fn request_ids_are_short_and_alphanumeric() {
        let id = UsageTracker::next_request_id();
        assert_eq!(id.len(), REQUEST_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn usage_stats_are_zeroed_for_any_user() {
        let tracker = UsageTracker::new();
        for user in ["alice", "bob", ""] {
            let stats = tracker.user_usage_stats(user, 7);
            assert_eq!(stats.total_requests, 0);
            assert_eq!(stats.successful_requests, 0);
            assert_eq!(stats.failed_requests, 0);
            assert_eq!(stats.total_tokens, 0);
            assert_eq!(stats.daily.len(), 7);
            assert!(stats.daily.iter().all(|d| d.requests == 0 && d.tokens == 0));
        }
    }

    #[test]
    fn increment_reports_a_single_request() {
        let tracker = UsageTracker::new();
        assert_eq!(tracker.increment_user_requests("alice").requests_used, 1);
    }
}
