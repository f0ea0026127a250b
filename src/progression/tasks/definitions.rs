//! Daily and weekly task catalogue

use super::period::PeriodKind;

/// A task on the daily or weekly board
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub id: &'static str,
    pub period: PeriodKind,
    /// Activity kind that advances this task
    pub activity: &'static str,
    pub target: u32,
    /// XP granted once per period when the target is reached
    pub xp_reward: i64,
    pub description: &'static str,
}

pub static TASKS: &[TaskDefinition] = &[
    // === DAILY ===
    TaskDefinition {
        id: "generate_recipe",
        period: PeriodKind::Daily,
        activity: "recipe_generation",
        target: 1,
        xp_reward: 10,
        description: "Generate a recipe",
    },
    TaskDefinition {
        id: "complete_quiz",
        period: PeriodKind::Daily,
        activity: "quiz_completion_base",
        target: 1,
        xp_reward: 10,
        description: "Complete a culinary quiz",
    },
    TaskDefinition {
        id: "update_inventory",
        period: PeriodKind::Daily,
        activity: "inventory_update",
        target: 3,
        xp_reward: 15,
        description: "Update the inventory 3 times",
    },
    // === WEEKLY ===
    TaskDefinition {
        id: "recipe_marathon",
        period: PeriodKind::Weekly,
        activity: "recipe_generation",
        target: 5,
        xp_reward: 50,
        description: "Generate 5 recipes",
    },
    TaskDefinition {
        id: "launch_campaigns",
        period: PeriodKind::Weekly,
        activity: "campaign_creation",
        target: 2,
        xp_reward: 40,
        description: "Create 2 marketing campaigns",
    },
    TaskDefinition {
        id: "quiz_ace",
        period: PeriodKind::Weekly,
        activity: "quiz_perfect_score",
        target: 3,
        xp_reward: 75,
        description: "Score 100% on 3 quizzes",
    },
    TaskDefinition {
        id: "enter_challenge",
        period: PeriodKind::Weekly,
        activity: "challenge_submission",
        target: 1,
        xp_reward: 50,
        description: "Submit a cooking challenge entry",
    },
];

impl TaskDefinition {
    pub fn get(id: &str) -> Option<&'static TaskDefinition> {
        TASKS.iter().find(|t| t.id == id)
    }

    /// Tasks on one board
    pub fn for_period(period: PeriodKind) -> impl Iterator<Item = &'static TaskDefinition> {
        TASKS.iter().filter(move |t| t.period == period)
    }
}
