//! CLI command implementations

pub mod achievements;
pub mod award;
pub mod init;
pub mod leaderboard;
pub mod levels;
pub mod profile;
pub mod tasks;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// Run a blocking store operation on the blocking pool, bounded by `timeout`
pub(crate) async fn run_blocking<T, F>(timeout: Duration, op: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(op);
    tokio::time::timeout(timeout, handle)
        .await
        .with_context(|| format!("Operation timed out after {}ms", timeout.as_millis()))?
        .context("Store task panicked")?
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Text progress bar, e.g. `[#####.....]`
pub(crate) fn bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}
