//! Leaderboard command implementation

use anyhow::Result;
use std::time::Duration;

use brigade::ProgressionEngine;

use super::{print_json, run_blocking};

pub async fn leaderboard_command(
    engine: ProgressionEngine,
    timeout: Duration,
    limit: usize,
    json: bool,
) -> Result<()> {
    let entries = run_blocking(timeout, move || Ok(engine.leaderboard(limit)?)).await?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No progression recorded yet.");
        return Ok(());
    }

    println!("{:>4}  {:<20} {:>5}  {:<16} {:>10}  {:>4}", "#", "User", "Level", "Title", "XP", "🏆");
    for entry in &entries {
        println!(
            "{:>4}  {:<20} {:>5}  {:<16} {:>10}  {:>4}",
            entry.rank, entry.user_id, entry.level, entry.title, entry.total_xp, entry.achievements
        );
    }

    Ok(())
}
