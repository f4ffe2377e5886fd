// crates/server/src/lib.rs
//! Taskpulse server library.
//!
//! Axum application serving the task progress pages, the polling and SSE
//! progress endpoints, and the health and metrics endpoints.

pub mod config;
pub mod error;
pub mod html;
pub mod metrics;
pub mod routes;
pub mod session;
pub mod state;

pub use error::*;
pub use metrics::{init_metrics, render_metrics};
pub use routes::app_routes;
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(app_routes(state))
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
