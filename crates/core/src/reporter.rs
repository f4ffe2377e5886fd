// crates/core/src/reporter.rs
//! Progress reporting, polled or streamed.
//!
//! Both variants derive elapsed time from the record's original start, so a
//! client that reconnects never changes when the task finishes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tokio_stream::Stream;

use crate::janitor::Janitor;
use crate::store::{Completion, TaskStore};
use crate::task::{SessionId, TaskId, TaskRecord, TaskSnapshot};

/// Answer to a single non-blocking progress query.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// No record for the session. Terminal.
    NoTask,
    Running {
        task_id: TaskId,
        elapsed: Duration,
        remaining: Duration,
        duration: Duration,
    },
    Completed {
        task_id: TaskId,
        duration: Duration,
    },
}

/// One event on a progress stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        task_id: TaskId,
        started_at: DateTime<Utc>,
        duration: Duration,
    },
    Completed {
        task_id: TaskId,
        /// Time from the original start until this stream observed completion.
        elapsed: Duration,
    },
    /// No task for the session, or it was replaced while waiting. Terminal.
    NoTask,
}

impl ProgressEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::Started { .. } => "started",
            ProgressEvent::Completed { .. } => "completed",
            ProgressEvent::NoTask => "error",
        }
    }
}

/// Reads task state for clients.
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn TaskStore>,
    janitor: Janitor,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn TaskStore>, janitor: Janitor) -> Self {
        Self { store, janitor }
    }

    /// Report current progress without suspending.
    pub fn poll(&self, session_id: &SessionId) -> PollOutcome {
        let Some(record) = self.store.get(session_id) else {
            return PollOutcome::NoTask;
        };
        if record.is_completed() {
            return completed(&record);
        }

        let now = Instant::now();
        if !record.is_due(now) {
            return PollOutcome::Running {
                task_id: record.id,
                elapsed: record.elapsed(now),
                remaining: record.remaining(now),
                duration: record.duration,
            };
        }

        match self.janitor.settle(session_id, record.id) {
            Completion::Transitioned(done) | Completion::AlreadyCompleted(done) => completed(&done),
            Completion::NotDue(current) => PollOutcome::Running {
                task_id: current.id,
                elapsed: current.elapsed(now),
                remaining: current.remaining(now),
                duration: current.duration,
            },
            // Replaced or removed between the read and the transition.
            Completion::Superseded | Completion::Missing => self.poll_current(session_id),
        }
    }

    /// Poll, then return a serializable view of whatever record remains.
    pub fn snapshot(&self, session_id: &SessionId) -> Option<TaskSnapshot> {
        if self.poll(session_id) == PollOutcome::NoTask {
            return None;
        }
        self.store
            .get(session_id)
            .map(|record| record.snapshot(Instant::now()))
    }

    fn poll_current(&self, session_id: &SessionId) -> PollOutcome {
        match self.store.get(session_id) {
            None => PollOutcome::NoTask,
            Some(record) if record.is_completed() => completed(&record),
            Some(record) => {
                let now = Instant::now();
                PollOutcome::Running {
                    task_id: record.id,
                    elapsed: record.elapsed(now),
                    remaining: record.remaining(now),
                    duration: record.duration,
                }
            }
        }
    }

    /// Stream progress for one session.
    ///
    /// Emits `Started`, then suspends once for the time remaining, then emits
    /// `Completed`. A missing record yields a single `NoTask`. Dropping the
    /// stream cancels only this observer; the launch-time timer still
    /// completes the record.
    pub fn stream(&self, session_id: SessionId) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        let store = Arc::clone(&self.store);
        let janitor = self.janitor.clone();

        async_stream::stream! {
            let Some(record) = store.get(&session_id) else {
                tracing::debug!(session_id = %session_id, "progress stream for unknown task");
                yield ProgressEvent::NoTask;
                return;
            };

            yield ProgressEvent::Started {
                task_id: record.id,
                started_at: record.started_at,
                duration: record.duration,
            };

            let remaining = record.remaining(Instant::now());
            if !record.is_completed() && !remaining.is_zero() {
                tracing::debug!(
                    session_id = %session_id,
                    task_id = record.id,
                    remaining_ms = remaining.as_millis() as u64,
                    "waiting for task"
                );
                tokio::time::sleep(remaining).await;
            }

            match janitor.settle(&session_id, record.id) {
                Completion::Transitioned(done) | Completion::AlreadyCompleted(done) => {
                    let finished = done.completed.unwrap_or_else(Instant::now);
                    yield ProgressEvent::Completed {
                        task_id: done.id,
                        elapsed: finished.saturating_duration_since(done.started),
                    };
                }
                Completion::NotDue(current) => {
                    // Cannot happen for the same record after sleeping the
                    // remaining time; report it rather than loop.
                    tracing::warn!(
                        session_id = %session_id,
                        task_id = current.id,
                        "task not due after waiting"
                    );
                    yield ProgressEvent::NoTask;
                }
                Completion::Superseded | Completion::Missing => {
                    tracing::debug!(session_id = %session_id, task_id = record.id, "task replaced while waiting");
                    yield ProgressEvent::NoTask;
                }
            }
        }
    }
}

fn completed(record: &TaskRecord) -> PollOutcome {
    PollOutcome::Completed {
        task_id: record.id,
        duration: record.duration,
    }
}
