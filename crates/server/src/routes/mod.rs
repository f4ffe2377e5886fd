//! Route handlers for the task progress server.

pub mod health;
pub mod lottery;
pub mod metrics;
pub mod pages;
pub mod tasks;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined router.
///
/// Routes:
/// - GET  / - Home page, issues the session cookie
/// - GET  /lottery - Lottery stream page
/// - GET  /lottery-numbers - SSE stream of lottery draws
/// - POST /start-task - Launch a task for the cookie session
/// - GET  /task-progress-poll/{session_id} - Polling progress fragment
/// - GET  /task-progress/{session_id} - SSE progress stream
/// - GET  /api/tasks/{session_id} - JSON task snapshot
/// - GET  /api/health - Health check
/// - GET  /metrics - Prometheus metrics
pub fn app_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(pages::router())
        .merge(tasks::router())
        .merge(lottery::router())
        .merge(metrics::router())
        .nest("/api", health::router())
        .with_state(state)
}
