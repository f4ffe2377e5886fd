// crates/core/src/lib.rs
//! In-memory background task tracking.
//!
//! A session launches a simulated task of random duration; clients observe
//! it by polling or over a stream. Completed records are cleaned up after a
//! short grace period.

pub mod config;
pub mod error;
pub mod janitor;
pub mod launcher;
pub mod reporter;
pub mod store;
pub mod task;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::*;
pub use janitor::Janitor;
pub use launcher::TaskLauncher;
pub use reporter::{PollOutcome, ProgressEvent, ProgressReporter};
pub use store::{Completion, InMemoryTaskStore, TaskStore};
pub use task::*;
pub use tracker::TaskTracker;
