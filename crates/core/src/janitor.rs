// crates/core/src/janitor.rs
//! Deferred removal of completed task records.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::store::{Completion, TaskStore};
use crate::task::{SessionId, TaskId};

/// Removes completed records after a grace period.
///
/// Each scheduled deletion is tagged with the record's `TaskId`. If the
/// session was relaunched in the meantime the deletion is a no-op.
#[derive(Clone)]
pub struct Janitor {
    store: Arc<dyn TaskStore>,
    grace: Duration,
}

impl Janitor {
    pub fn new(store: Arc<dyn TaskStore>, grace: Duration) -> Self {
        Self { store, grace }
    }

    /// Schedule a single deferred delete of `task_id` for `session_id`.
    ///
    /// Call this only after winning the `Running -> Completed` transition so
    /// each record is scheduled at most once.
    pub fn schedule(&self, session_id: SessionId, task_id: TaskId) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let grace = self.grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if store.delete_if(&session_id, task_id) {
                tracing::debug!(session_id = %session_id, task_id, "removed completed task");
            } else {
                tracing::debug!(
                    session_id = %session_id,
                    task_id,
                    "skipped removal, record already gone or replaced"
                );
            }
        })
    }

    /// Complete the record if it is due and, when this call performed the
    /// transition, schedule its removal.
    pub fn settle(&self, session_id: &SessionId, task_id: TaskId) -> Completion {
        let outcome = self.store.complete_if_due(session_id, task_id, Instant::now());
        if let Completion::Transitioned(record) = &outcome {
            counter!("tasks_completed_total").increment(1);
            tracing::info!(
                session_id = %session_id,
                task_id,
                duration_secs = record.duration.as_secs(),
                "task completed"
            );
            self.schedule(session_id.clone(), task_id);
        }
        outcome
    }

    /// Periodically sweep completed records older than the grace period.
    ///
    /// Catches records whose scheduled deletion never ran, e.g. because the
    /// runtime was shutting down.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let grace = self.grace;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.sweep(Instant::now(), grace);
                if removed > 0 {
                    counter!("tasks_swept_total").increment(removed as u64);
                    tracing::info!(removed, "swept stale completed tasks");
                }
            }
        })
    }
}
