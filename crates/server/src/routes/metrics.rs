//! Prometheus metrics endpoint.
//!
//! Exposes application metrics in Prometheus text format at `GET /metrics`.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::metrics::render_metrics;
use crate::state::AppState;

/// GET /metrics - Prometheus metrics endpoint.
///
/// Returns 503 Service Unavailable if metrics are not initialized.
pub async fn metrics_handler() -> Response {
    match render_metrics() {
        Some(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics not initialized").into_response(),
    }
}

/// Create the metrics routes router.
///
/// Not nested under `/api`; `/metrics` is the standard scrape path.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", get(metrics_handler))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use taskpulse_core::TrackerConfig;
    use tower::ServiceExt;

    use crate::state::AppState;

    async fn scrape(state: std::sync::Arc<AppState>) -> (StatusCode, String, String) {
        let response = crate::create_app(state)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrape_reports_task_lifecycle() {
        crate::metrics::init_metrics();

        let state = AppState::in_memory(TrackerConfig::default()).unwrap();
        state
            .tracker
            .launcher()
            .launch_with_duration("scraped", Duration::from_secs(2))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2100)).await;

        let (status, content_type, body) = scrape(state).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.contains("text/plain"));
        assert!(body.contains("tasks_started_total"));
        assert!(body.contains("tasks_completed_total"));
    }
}
