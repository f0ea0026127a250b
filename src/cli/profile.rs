//! Profile command implementation

use anyhow::Result;
use serde::Serialize;
use std::time::Duration;

use brigade::ProgressionEngine;
use brigade::ProgressionRecord;
use brigade::progression::levels::LevelProgress;

use super::{bar, print_json, run_blocking};

#[derive(Serialize)]
struct ProfileView {
    #[serde(flatten)]
    record: ProgressionRecord,
    progress: LevelProgress,
}

/// Show a user's level bar, counters and unlocked achievements
pub async fn profile_command(
    engine: ProgressionEngine,
    timeout: Duration,
    user: String,
    json: bool,
) -> Result<()> {
    let view = run_blocking(timeout, move || {
        let record = engine.profile(&user)?;
        let progress = engine.level_progress(&user)?;
        Ok(ProfileView { record, progress })
    })
    .await?;

    if json {
        return print_json(&view);
    }

    let ProfileView { record, progress } = view;
    println!("{} - Level {} {}", record.user_id, progress.display_level, progress.title);
    println!(
        "  {} {}/{} XP ({} to next level)",
        bar(progress.fraction(), 20),
        progress.xp_into_level,
        progress.level_span,
        progress.xp_to_next
    );
    println!("  Total XP: {}", record.total_xp);
    if let Some(last) = record.last_activity_at {
        println!("  Last activity: {}", last.format("%Y-%m-%d %H:%M UTC"));
    }

    if !record.activity_counters.is_empty() {
        println!("\nActivity:");
        for (name, value) in &record.activity_counters {
            println!("  {:<24} {}", name, value);
        }
    }

    println!("\nAchievements: {}", record.achievements_unlocked.len());
    Ok(())
}
