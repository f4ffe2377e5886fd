// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use taskpulse_core::{TaskTracker, TrackerConfig, TrackerError};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Task registry plus the launcher, reporter and janitor over it.
    pub tracker: Arc<TaskTracker>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(tracker: Arc<TaskTracker>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            tracker,
        })
    }

    /// Create state over a fresh in-memory tracker.
    pub fn in_memory(config: TrackerConfig) -> Result<Arc<Self>, TrackerError> {
        Ok(Self::new(Arc::new(TaskTracker::in_memory(config)?)))
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::in_memory(TrackerConfig::default()).unwrap();
        assert!(state.uptime_secs() < 1);
        assert!(state.tracker.store().is_empty());
    }

    #[test]
    fn test_app_state_rejects_invalid_config() {
        let config = TrackerConfig {
            min_duration_secs: 5,
            max_duration_secs: 1,
            ..Default::default()
        };
        assert!(AppState::in_memory(config).is_err());
    }
}
