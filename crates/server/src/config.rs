// crates/server/src/config.rs
//! Command-line and environment configuration for the server binary.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use taskpulse_core::config::{
    DEFAULT_GRACE_SECS, DEFAULT_MAX_DURATION_SECS, DEFAULT_MIN_DURATION_SECS,
    DEFAULT_SWEEP_INTERVAL_SECS,
};
use taskpulse_core::TrackerConfig;

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Parser, Debug, Clone)]
#[command(name = "taskpulse", version, about = "Background task progress demo server")]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "TASKPULSE_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind. Falls back to `PORT`, then 5001.
    #[arg(long, env = "TASKPULSE_PORT")]
    pub port: Option<u16>,

    /// Shortest task duration in whole seconds.
    #[arg(long, default_value_t = DEFAULT_MIN_DURATION_SECS)]
    pub min_duration: u64,

    /// Longest task duration in whole seconds.
    #[arg(long, default_value_t = DEFAULT_MAX_DURATION_SECS)]
    pub max_duration: u64,

    /// Use this duration for every task instead of a random draw.
    #[arg(long, env = "TASKPULSE_FIXED_DURATION")]
    pub fixed_duration: Option<u64>,

    /// Seconds a completed task stays visible before removal.
    #[arg(long, default_value_t = DEFAULT_GRACE_SECS)]
    pub grace_secs: u64,

    /// Seconds between sweeps for completed tasks the janitor missed.
    #[arg(long, default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
    pub sweep_interval_secs: u64,
}

impl Cli {
    /// Resolve the bind address.
    pub fn addr(&self) -> SocketAddr {
        let port = self
            .port
            .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
            .unwrap_or(DEFAULT_PORT);
        SocketAddr::new(self.host, port)
    }

    /// Tracker settings. Not validated here; `TaskTracker::new` does that.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            min_duration_secs: self.min_duration,
            max_duration_secs: self.max_duration,
            fixed_duration_secs: self.fixed_duration,
            grace: Duration::from_secs(self.grace_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
        }
    }
}
