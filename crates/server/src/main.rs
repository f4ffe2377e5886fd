// crates/server/src/main.rs
//! Taskpulse server binary.
//!
//! Parses flags, builds the tracker, spawns the sweeper and serves the app.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use taskpulse_core::TaskTracker;
use taskpulse_server::config::Cli;
use taskpulse_server::{create_app, init_metrics, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,taskpulse_server=info,taskpulse_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.tracker_config();

    init_metrics();

    let tracker = Arc::new(TaskTracker::in_memory(config.clone()).context("invalid tracker configuration")?);
    let _sweeper = tracker.spawn_sweeper();
    let app = create_app(AppState::new(tracker));

    let addr = cli.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        %addr,
        min_duration_secs = config.min_duration_secs,
        max_duration_secs = config.max_duration_secs,
        grace_secs = config.grace.as_secs(),
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
