// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use taskpulse_core::TrackerError;
use thiserror::Error;

use crate::html;

/// Errors from HTML-returning handlers.
///
/// Every variant renders as an error-styled fragment rather than a failure
/// page. Client errors keep status 200 so HTMX swaps the fragment in.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),
}

impl ApiError {
    /// Status label for request metrics.
    pub fn metric_status(&self) -> &'static str {
        match self {
            ApiError::Tracker(TrackerError::MissingSession) => "missing_session",
            ApiError::Tracker(TrackerError::InvalidSession(_)) => "invalid_session",
            ApiError::Tracker(_) => "500",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Tracker(err) = &self;

        if !err.is_client_error() {
            tracing::error!(error = %err, "Tracker error");
            let fragment = html::error_fragment("Something went wrong. Please try again.");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fragment)).into_response();
        }

        let message = match err {
            TrackerError::InvalidSession(token) => {
                tracing::warn!(token = %token, "Invalid session token");
                "Invalid session. Reload the page to start a new session."
            }
            _ => {
                tracing::warn!("Request without session token");
                "No session found. Reload the page to start a new session."
            }
        };
        (StatusCode::OK, Html(html::error_fragment(message))).into_response()
    }
}

/// Result type alias for HTML handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn extract_response(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_missing_session_renders_fragment_with_200() {
        let response = ApiError::from(TrackerError::MissingSession).into_response();
        let (status, body) = extract_response(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("task-error"));
        assert!(body.contains("No session found"));
    }

    #[tokio::test]
    async fn test_invalid_session_does_not_echo_token() {
        let response =
            ApiError::from(TrackerError::InvalidSession("<script>".into())).into_response();
        let (status, body) = extract_response(response).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<script>"));
    }

    #[tokio::test]
    async fn test_server_side_error_hides_details() {
        let response =
            ApiError::from(TrackerError::InvalidDurationRange { min: 9, max: 1 }).into_response();
        let (status, body) = extract_response(response).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("task-error"));
        assert!(!body.contains("9..=1"));
    }

    #[test]
    fn test_metric_status_by_kind() {
        assert_eq!(
            ApiError::from(TrackerError::MissingSession).metric_status(),
            "missing_session"
        );
        assert_eq!(
            ApiError::from(TrackerError::InvalidSession("x".into())).metric_status(),
            "invalid_session"
        );
        assert_eq!(
            ApiError::from(TrackerError::InvalidSweepInterval).metric_status(),
            "500"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::from(TrackerError::MissingSession);
        assert_eq!(err.to_string(), "Tracker error: No session token present");
    }
}
