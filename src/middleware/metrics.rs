//! Prometheus recorder for request-level metrics.
//!
//! Fed by the usage middleware on every completed request and exposed
//! at `/metrics` for scraping.

use once_cell::sync::Lazy;
use prometheus::{
    opts, register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec,
    TextEncoder,
};

use crate::middleware::usage::RequestRecord;

static RECORDER: Lazy<PrometheusRecorder> = Lazy::new(PrometheusRecorder::new);

/// Request counters and latency histogram, registered in the global
/// default registry.
struct PrometheusRecorder {
    requests_total: CounterVec,
    request_duration_seconds: HistogramVec,
}

impl PrometheusRecorder {
    fn new() -> Self {
        let requests_total = register_counter_vec!(
            opts!("timeai_requests_total", "Total number of handled requests"),
            &["method", "status_code"]
        )
        .expect("failed to register timeai_requests_total");

        let request_duration_seconds = register_histogram_vec!(
            prometheus::histogram_opts!(
                "timeai_request_duration_seconds",
                "Request latency in seconds",
                vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
            ),
            &["method"]
        )
        .expect("failed to register timeai_request_duration_seconds");

        Self {
            requests_total,
            request_duration_seconds,
        }
    }

    fn observe(&self, record: &RequestRecord, elapsed_ms: u64) {
        let status = record.status.to_string();
        self.requests_total
            .with_label_values(&[&record.method, &status])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[&record.method])
            .observe(elapsed_ms as f64 / 1000.0);
    }
}

/// Record a completed request.
pub fn record(record: &RequestRecord, elapsed_ms: u64) {
    RECORDER.observe(record, elapsed_ms);
}

/// Encode all registered metrics as Prometheus text format.
/// Called by the `/metrics` HTTP handler.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

// ── Tests ─────────────────────────────────────────────────────
