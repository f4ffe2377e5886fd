//! Task lifecycle endpoints.
//!
//! - POST /start-task                       - launch a task for the cookie session
//! - GET  /task-progress-poll/{session_id}  - HTML fragment snapshot (polling)
//! - GET  /task-progress/{session_id}       - SSE stream: started, then completed
//! - GET  /api/tasks/{session_id}           - JSON snapshot

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use taskpulse_core::{PollOutcome, ProgressEvent, SessionId, TaskSnapshot};
use tokio_stream::StreamExt;

use crate::error::ApiResult;
use crate::html;
use crate::metrics::{RequestTimer, StreamGuard};
use crate::session::session_from_jar;
use crate::state::AppState;

/// How the client wants to follow a freshly started task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    #[default]
    Stream,
    Poll,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartTaskQuery {
    #[serde(default)]
    pub mode: ProgressMode,
}

/// Build the tasks router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start-task", post(start_task))
        .route("/task-progress-poll/{session_id}", get(poll_progress))
        .route("/task-progress/{session_id}", get(stream_progress))
        .route("/api/tasks/{session_id}", get(task_status))
}

/// POST /start-task - replace any task for this session with a new one.
///
/// Returns immediately with a fragment that either opens the progress stream
/// or starts polling, depending on `?mode=`.
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StartTaskQuery>,
    jar: CookieJar,
) -> ApiResult<Html<String>> {
    let timer = RequestTimer::new("start_task");
    let result = start_fragment(&state, query.mode, &jar).map(Html);
    timer.finish_result(&result);
    result
}

fn start_fragment(state: &AppState, mode: ProgressMode, jar: &CookieJar) -> ApiResult<String> {
    let session_id = session_from_jar(jar)?;
    let record = state.tracker.launcher().launch(session_id.as_str())?;

    Ok(match mode {
        ProgressMode::Stream => html::task_streaming(&record.session_id, record.id),
        ProgressMode::Poll => {
            html::task_polling(&record.session_id, record.id, Duration::ZERO, record.duration)
        }
    })
}

/// GET /task-progress-poll/{session_id} - current progress, never blocks.
pub async fn poll_progress(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Html<String>> {
    let timer = RequestTimer::new("poll_progress");
    let result = poll_fragment(&state, &session_id).map(Html);
    timer.finish_result(&result);
    result
}

fn poll_fragment(state: &AppState, raw_session_id: &str) -> ApiResult<String> {
    let session_id = SessionId::parse(raw_session_id)?;

    Ok(match state.tracker.reporter().poll(&session_id) {
        PollOutcome::NoTask => html::no_task(),
        PollOutcome::Running {
            task_id,
            elapsed,
            duration,
            ..
        } => html::task_polling(&session_id, task_id, elapsed, duration),
        PollOutcome::Completed { task_id, duration } => {
            html::task_completed(&session_id, task_id, duration)
        }
    })
}

/// SSE handler that streams one task's progress.
///
/// # Events
///
/// | Event name  | When emitted                                   |
/// |-------------|------------------------------------------------|
/// | `started`   | Immediately, if the session has a task         |
/// | `completed` | Once the task's duration has elapsed           |
/// | `error`     | Invalid session, no task, or task replaced     |
///
/// The stream terminates after `completed` or `error`. Each event carries an
/// HTML fragment.
pub async fn stream_progress(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let reporter = state.tracker.reporter().clone();
    let parsed = SessionId::parse(&session_id);

    let stream = async_stream::stream! {
        let _guard = StreamGuard::open();
        let session_id = match parsed {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(error = %err, "progress stream rejected");
                let fragment = html::error_fragment("Invalid session. Reload the page to start a new session.");
                yield Ok(Event::default().event("error").data(fragment));
                return;
            }
        };

        let mut events = Box::pin(reporter.stream(session_id.clone()));
        while let Some(event) = events.next().await {
            yield Ok(to_sse_event(&session_id, &event));
        }
    };

    Sse::new(stream)
}

fn to_sse_event(session_id: &SessionId, event: &ProgressEvent) -> Event {
    let data = match event {
        ProgressEvent::Started {
            started_at,
            duration,
            ..
        } => html::task_started(*started_at, *duration),
        ProgressEvent::Completed { task_id, elapsed } => {
            html::task_completed(session_id, *task_id, *elapsed)
        }
        ProgressEvent::NoTask => html::no_task(),
    };
    Event::default().event(event.name()).data(data)
}

/// GET /api/tasks/{session_id} - JSON snapshot for scripted clients.
pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<TaskSnapshot>, StatusCode> {
    let session_id = SessionId::parse(&session_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    state
        .tracker
        .reporter()
        .snapshot(&session_id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
