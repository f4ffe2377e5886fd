// crates/core/src/config.rs
//! Tracker tuning knobs.

use std::time::Duration;

use crate::error::TrackerError;

pub const DEFAULT_MIN_DURATION_SECS: u64 = 2;
pub const DEFAULT_MAX_DURATION_SECS: u64 = 6;
/// How long a completed record stays queryable before the janitor removes it.
pub const DEFAULT_GRACE_SECS: u64 = 2;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Configuration for the launcher and janitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Inclusive lower bound for randomized task duration, in seconds.
    pub min_duration_secs: u64,
    /// Inclusive upper bound for randomized task duration, in seconds.
    pub max_duration_secs: u64,
    /// Overrides the random draw when set.
    pub fixed_duration_secs: Option<u64>,
    pub grace: Duration,
    pub sweep_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: DEFAULT_MIN_DURATION_SECS,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            fixed_duration_secs: None,
            grace: Duration::from_secs(DEFAULT_GRACE_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.min_duration_secs > self.max_duration_secs {
            return Err(TrackerError::InvalidDurationRange {
                min: self.min_duration_secs,
                max: self.max_duration_secs,
            });
        }
        if self.grace.is_zero() {
            return Err(TrackerError::InvalidGracePeriod);
        }
        if self.sweep_interval.is_zero() {
            return Err(TrackerError::InvalidSweepInterval);
        }
        Ok(())
    }

    /// Builder-style override for the fixed duration (tests, demos).
    pub fn with_fixed_duration(mut self, secs: u64) -> Self {
        self.fixed_duration_secs = Some(secs);
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}
