//! Achievements command implementation

use anyhow::Result;
use std::time::Duration;

use brigade::ProgressionEngine;

use super::{print_json, run_blocking};

pub async fn achievements_command(
    engine: ProgressionEngine,
    timeout: Duration,
    user: String,
    json: bool,
) -> Result<()> {
    let statuses =
        run_blocking(timeout, move || Ok(engine.achievement_showcase(&user)?)).await?;

    if json {
        return print_json(&statuses);
    }

    let unlocked = statuses.iter().filter(|s| s.unlocked).count();
    println!("Achievements ({}/{}):\n", unlocked, statuses.len());

    let mut category = None;
    for status in &statuses {
        let achievement = status.achievement;
        if category != Some(achievement.category) {
            category = Some(achievement.category);
            println!("{}", achievement.category.label());
        }
        if status.unlocked {
            println!("  {} {:<20} {}", achievement.icon, achievement.name, achievement.description);
        } else {
            println!(
                "  🔒 {:<20} {} ({}/{}, {:.0}%)",
                achievement.name,
                achievement.description,
                status.progress,
                achievement.rule.threshold(),
                status.progress_percent()
            );
        }
    }

    Ok(())
}
