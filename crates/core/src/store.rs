// crates/core/src/store.rs
//! Task registry: at most one record per session.
//!
//! `TaskStore` is the seam for swapping in a real backing store. The
//! in-memory implementation is the only shared mutable state in the process.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

use crate::task::{SessionId, TaskId, TaskRecord};

/// Result of an atomic completion attempt.
#[derive(Debug, Clone)]
pub enum Completion {
    /// This call flipped the record to `Completed`. The caller owns janitor scheduling.
    Transitioned(TaskRecord),
    /// Someone else already completed it.
    AlreadyCompleted(TaskRecord),
    /// Still running; elapsed has not reached duration.
    NotDue(TaskRecord),
    /// The session now holds a newer record.
    Superseded,
    /// No record for the session.
    Missing,
}

impl Completion {
    pub fn is_completed(&self) -> bool {
        matches!(self, Completion::Transitioned(_) | Completion::AlreadyCompleted(_))
    }
}

/// Keyed store of task records.
///
/// Every method is a single critical section; implementations must never
/// suspend between reading and writing a record.
pub trait TaskStore: Send + Sync {
    /// Store unconditionally, returning the record it replaced.
    fn put(&self, record: TaskRecord) -> Option<TaskRecord>;

    fn get(&self, session_id: &SessionId) -> Option<TaskRecord>;

    fn delete(&self, session_id: &SessionId) -> Option<TaskRecord>;

    /// Delete only if the current record still carries `task_id`.
    fn delete_if(&self, session_id: &SessionId, task_id: TaskId) -> bool;

    /// Complete the record identified by `task_id` if it is due at `now`.
    fn complete_if_due(&self, session_id: &SessionId, task_id: TaskId, now: Instant) -> Completion;

    /// Remove completed records whose completion is at least `grace` old.
    fn sweep(&self, now: Instant, grace: Duration) -> usize;

    /// Records currently held, running or completed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Running records, for the health endpoint.
    fn running(&self) -> usize;
}

/// Process-local `TaskStore` backed by a `HashMap`.
///
/// Uses `std::sync::RwLock` because no lock is ever held across an `.await`.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<SessionId, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn put(&self, record: TaskRecord) -> Option<TaskRecord> {
        match self.records.write() {
            Ok(mut records) => records.insert(record.session_id.clone(), record),
            Err(e) => {
                tracing::error!("RwLock poisoned writing task records: {e}");
                None
            }
        }
    }

    fn get(&self, session_id: &SessionId) -> Option<TaskRecord> {
        match self.records.read() {
            Ok(records) => records.get(session_id).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading task records: {e}");
                None
            }
        }
    }

    fn delete(&self, session_id: &SessionId) -> Option<TaskRecord> {
        match self.records.write() {
            Ok(mut records) => records.remove(session_id),
            Err(e) => {
                tracing::error!("RwLock poisoned deleting task record: {e}");
                None
            }
        }
    }

    fn delete_if(&self, session_id: &SessionId, task_id: TaskId) -> bool {
        match self.records.write() {
            Ok(mut records) => {
                if records.get(session_id).is_some_and(|r| r.id == task_id) {
                    records.remove(session_id);
                    true
                } else {
                    false
                }
            }
            Err(e) => {
                tracing::error!("RwLock poisoned deleting task record: {e}");
                false
            }
        }
    }

    fn complete_if_due(&self, session_id: &SessionId, task_id: TaskId, now: Instant) -> Completion {
        let mut records = match self.records.write() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::error!("RwLock poisoned completing task record: {e}");
                return Completion::Missing;
            }
        };
        let Some(record) = records.get_mut(session_id) else {
            return Completion::Missing;
        };
        if record.id != task_id {
            return Completion::Superseded;
        }
        if record.is_completed() {
            return Completion::AlreadyCompleted(record.clone());
        }
        if !record.is_due(now) {
            return Completion::NotDue(record.clone());
        }
        record.mark_completed(now);
        Completion::Transitioned(record.clone())
    }

    fn sweep(&self, now: Instant, grace: Duration) -> usize {
        match self.records.write() {
            Ok(mut records) => {
                let before = records.len();
                records.retain(|_, r| match r.completed {
                    Some(done) => now.saturating_duration_since(done) < grace,
                    None => true,
                });
                before - records.len()
            }
            Err(e) => {
                tracing::error!("RwLock poisoned sweeping task records: {e}");
                0
            }
        }
    }

    fn len(&self) -> usize {
        match self.records.read() {
            Ok(records) => records.len(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading task records: {e}");
                0
            }
        }
    }

    fn running(&self) -> usize {
        match self.records.read() {
            Ok(records) => records.values().filter(|r| !r.is_completed()).count(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading task records: {e}");
                0
            }
        }
    }
}
