// crates/core/src/task.rs
//! Task record types shared by the registry, launcher, reporter and janitor.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::error::TrackerError;

/// Longest session token accepted from a cookie or path segment.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Process-unique identity of one task record.
///
/// A new id is minted on every launch, so a deferred operation tagged with
/// an older id can tell that its record has been replaced.
pub type TaskId = u64;

/// Opaque token correlating a browser session to at most one task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Validate a raw token.
    ///
    /// Accepts 1..=128 characters from `[A-Za-z0-9_-]` after trimming. Anything
    /// else is a client protocol violation.
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TrackerError::MissingSession);
        }
        if trimmed.len() > MAX_SESSION_ID_LEN
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TrackerError::InvalidSession(trimmed.chars().take(32).collect()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Mint a fresh random session token (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a task. Only ever moves `Running -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
        }
    }
}

/// One in-flight or recently finished unit of simulated work.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: TaskId,
    pub session_id: SessionId,
    pub status: TaskStatus,
    /// Fixed at creation, never changed.
    pub duration: Duration,
    /// Monotonic start. All elapsed/remaining math derives from this.
    pub started: Instant,
    pub started_at: DateTime<Utc>,
    pub completed: Option<Instant>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(id: TaskId, session_id: SessionId, duration: Duration) -> Self {
        Self {
            id,
            session_id,
            status: TaskStatus::Running,
            duration,
            started: Instant::now(),
            started_at: Utc::now(),
            completed: None,
            completed_at: None,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Time left until the task is due, zero once it is.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.duration
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Flip to `Completed`. Returns false if the record was already completed.
    pub(crate) fn mark_completed(&mut self, now: Instant) -> bool {
        if self.is_completed() {
            return false;
        }
        self.status = TaskStatus::Completed;
        self.completed = Some(now);
        self.completed_at = Some(Utc::now());
        true
    }

    pub fn snapshot(&self, now: Instant) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id,
            session_id: self.session_id.clone(),
            status: self.status,
            duration_secs: self.duration.as_secs(),
            elapsed_secs: self.elapsed(now).min(self.duration).as_secs_f64(),
            remaining_secs: self.remaining(now).as_secs_f64(),
            started_at: self.started_at.to_rfc3339(),
            completed_at: self.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Serializable view of a record, used by the JSON status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub session_id: SessionId,
    pub status: TaskStatus,
    pub duration_secs: u64,
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_parse_trims_and_accepts_uuid() {
        let id = SessionId::parse("  3f2b8c1e-aaaa-4bbb-8ccc-1234567890ab ").unwrap();
        assert_eq!(id.as_str(), "3f2b8c1e-aaaa-4bbb-8ccc-1234567890ab");
    }

    #[test]
    fn test_session_id_parse_rejects_empty() {
        assert!(matches!(SessionId::parse("   "), Err(TrackerError::MissingSession)));
        assert!(matches!(SessionId::parse(""), Err(TrackerError::MissingSession)));
    }

    #[test]
    fn test_session_id_parse_rejects_markup_and_long_tokens() {
        assert!(matches!(
            SessionId::parse("<script>"),
            Err(TrackerError::InvalidSession(_))
        ));
        let long = "a".repeat(MAX_SESSION_ID_LEN + 1);
        assert!(matches!(SessionId::parse(&long), Err(TrackerError::InvalidSession(_))));
    }

    #[test]
    fn test_generated_session_ids_are_valid_and_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(SessionId::parse(a.as_str()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_elapsed_and_remaining() {
        let record = TaskRecord::new(1, SessionId::generate(), Duration::from_secs(3));
        tokio::time::advance(Duration::from_secs(1)).await;

        let now = Instant::now();
        assert_eq!(record.elapsed(now), Duration::from_secs(1));
        assert_eq!(record.remaining(now), Duration::from_secs(2));
        assert!(!record.is_due(now));

        tokio::time::advance(Duration::from_secs(5)).await;
        let now = Instant::now();
        assert_eq!(record.remaining(now), Duration::ZERO);
        assert!(record.is_due(now));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_completed_only_once() {
        let mut record = TaskRecord::new(1, SessionId::generate(), Duration::from_secs(2));
        let now = Instant::now();
        assert!(record.mark_completed(now));
        assert!(!record.mark_completed(now));
        assert_eq!(record.status, TaskStatus::Completed);
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
