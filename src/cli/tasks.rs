//! Tasks command implementation

use anyhow::Result;
use chrono::Utc;
use std::time::Duration;

use brigade::ProgressionEngine;
use brigade::progression::tasks::TaskDefinition;

use super::{print_json, run_blocking};

/// Show the current daily and weekly boards for a user
pub async fn tasks_command(
    engine: ProgressionEngine,
    timeout: Duration,
    user: String,
    json: bool,
) -> Result<()> {
    let boards = run_blocking(timeout, move || Ok(engine.task_boards(&user, Utc::now())?)).await?;

    if json {
        return print_json(&boards);
    }

    for board in &boards {
        println!(
            "{} tasks ({}) - {}/{} done",
            board.period.label(),
            board.period_key,
            board.completed_count(),
            board.tasks.len()
        );
        for (id, task) in &board.tasks {
            let mark = if task.completed { "x" } else { " " };
            let (description, reward) = TaskDefinition::get(id)
                .map(|def| (def.description, def.xp_reward))
                .unwrap_or((id.as_str(), 0));
            println!(
                "  [{}] {:<32} {}/{}  +{} XP",
                mark, description, task.progress, task.target, reward
            );
        }
        println!();
    }

    Ok(())
}
