// crates/core/src/error.rs
use thiserror::Error;

/// Errors raised by the task tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("No session token present")]
    MissingSession,

    #[error("Invalid session token: {0}")]
    InvalidSession(String),

    #[error("Invalid duration range: {min}..={max} seconds")]
    InvalidDurationRange { min: u64, max: u64 },

    #[error("Invalid grace period: must be greater than zero")]
    InvalidGracePeriod,

    #[error("Invalid sweep interval: must be greater than zero")]
    InvalidSweepInterval,
}

impl TrackerError {
    /// Whether the error was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingSession | Self::InvalidSession(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_error_display() {
        assert_eq!(TrackerError::MissingSession.to_string(), "No session token present");
        assert_eq!(
            TrackerError::InvalidDurationRange { min: 6, max: 2 }.to_string(),
            "Invalid duration range: 6..=2 seconds"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(TrackerError::MissingSession.is_client_error());
        assert!(TrackerError::InvalidSession("x".into()).is_client_error());
        assert!(!TrackerError::InvalidGracePeriod.is_client_error());
        assert!(!TrackerError::InvalidSweepInterval.is_client_error());
    }
}
