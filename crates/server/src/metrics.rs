//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric descriptions for the task tracker counters
//! - Helpers for request timing and open SSE stream accounting

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

use crate::error::ApiResult;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded. Concurrent callers
/// block until the first finishes, so the handle is always set on return.
/// Returns `true` if this call installed the recorder.
pub fn init_metrics() -> bool {
    let mut installed = false;
    PROMETHEUS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("Failed to set global metrics recorder (already set)");
        } else {
            describe_metrics();
            installed = true;
            tracing::info!("Prometheus metrics initialized");
        }
        handle
    });
    installed
}

fn describe_metrics() {
    describe_counter!("tasks_started_total", "Tasks launched, including replacements");
    describe_counter!("tasks_completed_total", "Tasks that reached their duration");
    describe_counter!(
        "tasks_swept_total",
        "Completed tasks removed by the periodic sweeper"
    );
    describe_gauge!("sse_streams_open", "Progress streams currently connected");
    describe_counter!("http_requests_total", "Requests by endpoint and status");
    describe_histogram!(
        "http_request_duration_seconds",
        "Duration of non-streaming requests in seconds"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record a completed request.
pub fn record_request(endpoint: &str, status: &str, duration: std::time::Duration) {
    counter!("http_requests_total", "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("http_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

/// Helper for timing request handlers.
///
/// ```ignore
/// let timer = RequestTimer::new("start_task");
/// // ... do work ...
/// timer.finish_ok(); // or timer.finish_result(&result)
/// ```
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn finish_ok(self) {
        record_request(self.endpoint, "200", self.start.elapsed());
    }

    /// Finish timing with a custom status string.
    pub fn finish(self, status: &str) {
        record_request(self.endpoint, status, self.start.elapsed());
    }

    /// Finish timing with the outcome of an HTML handler.
    ///
    /// Errors are labelled by kind; client errors still render with HTTP 200.
    pub fn finish_result<T>(self, result: &ApiResult<T>) {
        match result {
            Ok(_) => self.finish_ok(),
            Err(err) => self.finish(err.metric_status()),
        }
    }
}

/// Tracks one open SSE stream. Decrements the gauge when dropped, which
/// happens both on normal completion and on client disconnect.
pub struct StreamGuard;

impl StreamGuard {
    pub fn open() -> Self {
        gauge!("sse_streams_open").increment(1.0);
        Self
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        gauge!("sse_streams_open").decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::new("test_endpoint");
        std::thread::sleep(std::time::Duration::from_millis(1));
        timer.finish_ok();
    }

    #[test]
    fn test_stream_guard_open_and_drop() {
        let guard = StreamGuard::open();
        drop(guard);
    }

    #[test]
    fn test_init_metrics_is_idempotent() {
        init_metrics();
        assert!(!init_metrics());
        assert!(render_metrics().is_some());
    }
}
