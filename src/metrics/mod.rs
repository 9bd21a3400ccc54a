//! # Metrics
//!
//! Prometheus counters alongside the JSON log stream, exposed on `GET /metrics`.
//!
//! **Counters:**
//! - `cw_api_log_records_total{level}` - Records written by the JSON logger
//!
//! **Histograms:**
//! - `cw_api_request_duration_seconds{status_class}` - Instrumented request latency

pub mod handler;

pub use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::logging::Severity;
use axum::http::StatusCode;
use std::time::Duration;

/// Count one emitted log record.
pub fn record_emitted(severity: Severity) {
    metrics::counter!("cw_api_log_records_total", "level" => severity.as_str()).increment(1);
}

/// Record the latency of an instrumented request.
pub fn record_request(status: StatusCode, elapsed: Duration) {
    metrics::histogram!(
        "cw_api_request_duration_seconds",
        "status_class" => status_class(status)
    )
    .record(elapsed.as_secs_f64());
}

/// `2xx`, `4xx`, ... label for a status code.
pub fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}

/// Install the Prometheus recorder with latency buckets.
///
/// Buckets: [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1, 2.5] seconds.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("cw_api_request_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Installed handle, or a detached one when a recorder already exists
/// (several app states in one test process).
pub fn handle_or_detached() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class_labels() {
        assert_eq!(status_class(StatusCode::OK), "2xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::INTERNAL_SERVER_ERROR), "5xx");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_emitted(Severity::Critical);
        record_request(StatusCode::OK, Duration::from_millis(12));
    }
}
