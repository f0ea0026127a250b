//! Award command implementation

use anyhow::Result;
use std::time::Duration;

use brigade::progression::achievements::Achievement;
use brigade::progression::levels::rank_title;
use brigade::{AwardContext, AwardOutcome, ProgressionEngine};

use super::{print_json, run_blocking};

/// Record one activity (or a batch) for a user
pub async fn award_command(
    engine: ProgressionEngine,
    timeout: Duration,
    user: String,
    activity: String,
    xp: Option<i64>,
    count: Option<u32>,
    json: bool,
) -> Result<()> {
    let context = AwardContext {
        count,
        ..AwardContext::default()
    };
    let outcome = {
        let (user, activity) = (user.clone(), activity.clone());
        run_blocking(timeout, move || Ok(engine.award(&user, &activity, xp, &context)?)).await?
    };

    if json {
        return print_json(&outcome);
    }

    if outcome.ignored {
        println!("No XP recorded for '{}' ({}).", activity, user);
        return Ok(());
    }

    print_outcome(&user, &activity, &outcome);
    Ok(())
}

fn print_outcome(user: &str, activity: &str, outcome: &AwardOutcome) {
    println!(
        "{}: {:+} XP for {} (total {} XP)",
        user, outcome.xp_applied, activity, outcome.total_xp
    );

    if outcome.leveled_up {
        println!(
            "  Level up! {} -> {} ({})",
            outcome.old_level,
            outcome.new_level,
            rank_title(outcome.new_level)
        );
    } else if outcome.new_level < outcome.old_level {
        println!("  Level dropped to {}", outcome.new_level);
    }

    for id in &outcome.newly_unlocked {
        if let Some(achievement) = Achievement::get(*id) {
            println!("  {} Achievement unlocked: {}", achievement.icon, achievement.name);
        }
    }

    for task in &outcome.completed_tasks {
        match &task.reward {
            Some(reward) => {
                println!(
                    "  {} task '{}' completed: {:+} XP",
                    task.period.label(),
                    task.task_id,
                    reward.xp_applied
                );
                if reward.leveled_up {
                    println!("  Level up! {} -> {}", reward.old_level, reward.new_level);
                }
            }
            None => println!(
                "  {} task '{}' completed (reward pending)",
                task.period.label(),
                task.task_id
            ),
        }
    }

    if outcome.tasks_degraded {
        eprintln!("Warning: task progress could not be fully recorded");
    }
}
