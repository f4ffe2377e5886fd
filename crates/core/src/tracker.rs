// crates/core/src/tracker.rs
//! Wires the registry, launcher, reporter and janitor together.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::janitor::Janitor;
use crate::launcher::TaskLauncher;
use crate::reporter::ProgressReporter;
use crate::store::{InMemoryTaskStore, TaskStore};

/// Owns one task store and the components sharing it.
///
/// Created once at startup and shared behind an `Arc`.
pub struct TaskTracker {
    store: Arc<dyn TaskStore>,
    launcher: TaskLauncher,
    reporter: ProgressReporter,
    janitor: Janitor,
    config: TrackerConfig,
}

impl TaskTracker {
    /// Build a tracker over the given store.
    pub fn new(store: Arc<dyn TaskStore>, config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        let janitor = Janitor::new(Arc::clone(&store), config.grace);
        Ok(Self {
            launcher: TaskLauncher::new(Arc::clone(&store), janitor.clone(), config.clone()),
            reporter: ProgressReporter::new(Arc::clone(&store), janitor.clone()),
            janitor,
            store,
            config,
        })
    }

    /// Build a tracker over a fresh in-memory store.
    pub fn in_memory(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::new(Arc::new(InMemoryTaskStore::new()), config)
    }

    pub fn launcher(&self) -> &TaskLauncher {
        &self.launcher
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Start the periodic sweeper using the configured interval.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        self.janitor.spawn_sweeper(self.config.sweep_interval)
    }
}
