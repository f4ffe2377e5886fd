// crates/core/src/launcher.rs
//! Task launcher: creates records and starts the server-side completion timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use rand::Rng;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::janitor::Janitor;
use crate::store::TaskStore;
use crate::task::{SessionId, TaskRecord};

/// Starts simulated background tasks.
///
/// Each launch replaces whatever record the session held and spawns exactly
/// one timer that completes the task when its duration elapses, whether or
/// not any client is still watching.
pub struct TaskLauncher {
    next_id: AtomicU64,
    store: Arc<dyn TaskStore>,
    janitor: Janitor,
    config: TrackerConfig,
}

impl TaskLauncher {
    pub fn new(store: Arc<dyn TaskStore>, janitor: Janitor, config: TrackerConfig) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            store,
            janitor,
            config,
        }
    }

    /// Launch a task with a duration drawn from the configured range.
    pub fn launch(&self, session_id: &str) -> Result<TaskRecord, TrackerError> {
        let duration = self.draw_duration();
        self.launch_with_duration(session_id, duration)
    }

    /// Launch a task with an explicit duration.
    pub fn launch_with_duration(
        &self,
        session_id: &str,
        duration: Duration,
    ) -> Result<TaskRecord, TrackerError> {
        let session_id = SessionId::parse(session_id)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = TaskRecord::new(id, session_id.clone(), duration);

        if let Some(previous) = self.store.put(record.clone()) {
            tracing::info!(
                session_id = %session_id,
                previous_task_id = previous.id,
                previous_status = previous.status.as_str(),
                "replacing existing task"
            );
        }
        counter!("tasks_started_total").increment(1);
        tracing::info!(
            session_id = %session_id,
            task_id = id,
            duration_secs = duration.as_secs(),
            "task started"
        );

        let janitor = self.janitor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            janitor.settle(&session_id, id);
        });

        Ok(record)
    }

    fn draw_duration(&self) -> Duration {
        let secs = match self.config.fixed_duration_secs {
            Some(secs) => secs,
            None => rand::thread_rng()
                .gen_range(self.config.min_duration_secs..=self.config.max_duration_secs),
        };
        Duration::from_secs(secs)
    }
}
