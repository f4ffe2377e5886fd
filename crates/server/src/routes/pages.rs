//! Full HTML pages.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use taskpulse_core::PollOutcome;

use crate::html;
use crate::session::ensure_session;
use crate::state::AppState;

/// Create the pages router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/lottery", get(lottery))
}

/// GET / - home page.
///
/// Issues a session cookie on first visit. A session with a running task gets
/// the streaming fragment again, which reconnects to its progress stream.
pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, session_id) = ensure_session(jar);

    let current = match state.tracker.reporter().poll(&session_id) {
        PollOutcome::NoTask => None,
        PollOutcome::Running { task_id, .. } => {
            tracing::debug!(session_id = %session_id, task_id, "reconnecting to running task");
            Some(html::task_streaming(&session_id, task_id))
        }
        PollOutcome::Completed { task_id, duration } => {
            Some(html::task_completed(&session_id, task_id, duration))
        }
    };

    (jar, Html(html::index_page(current)))
}

/// GET /lottery - page hosting the lottery number stream.
pub async fn lottery() -> Html<String> {
    Html(html::lottery_page())
}
