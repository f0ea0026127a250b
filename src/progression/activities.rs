//! Activity catalogue
//!
//! Maps an activity kind (the tag an activity source passes to `award`) to
//! its default XP and to the counter it increments.

use std::collections::HashMap;

/// Kind used by task completion rewards
pub const TASK_COMPLETION: &str = "task_completion";

/// Static definition of a known activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDefinition {
    pub kind: &'static str,
    /// Default XP; negative values are penalties
    pub xp: i64,
    /// Counter incremented in the user's record
    pub counter: &'static str,
}

/// All known activities
pub static ACTIVITIES: &[ActivityDefinition] = &[
    ActivityDefinition {
        kind: "recipe_generation",
        xp: 15,
        counter: "recipes_generated",
    },
    ActivityDefinition {
        kind: "menu_generation",
        xp: 20,
        counter: "menus_generated",
    },
    ActivityDefinition {
        kind: "quiz_completion_base",
        xp: 10,
        counter: "quizzes_completed",
    },
    ActivityDefinition {
        kind: "quiz_perfect_score",
        xp: 25,
        counter: "perfect_scores",
    },
    ActivityDefinition {
        kind: "inventory_update",
        xp: 5,
        counter: "inventory_updates",
    },
    ActivityDefinition {
        kind: "dish_recognition",
        xp: 10,
        counter: "dishes_recognized",
    },
    ActivityDefinition {
        kind: "dish_like",
        xp: 2,
        counter: "dishes_liked",
    },
    ActivityDefinition {
        kind: "campaign_creation",
        xp: 20,
        counter: "campaigns_created",
    },
    ActivityDefinition {
        kind: "campaign_like",
        xp: 3,
        counter: "campaign_likes",
    },
    ActivityDefinition {
        kind: "campaign_dislike",
        xp: -2,
        counter: "campaign_dislikes",
    },
    ActivityDefinition {
        kind: "chef_recipe_like",
        xp: 3,
        counter: "chef_recipe_likes",
    },
    ActivityDefinition {
        kind: "chef_recipe_dislike",
        xp: -1,
        counter: "chef_recipe_dislikes",
    },
    ActivityDefinition {
        kind: "challenge_submission",
        xp: 30,
        counter: "challenges_submitted",
    },
    ActivityDefinition {
        kind: "challenge_vote",
        xp: 2,
        counter: "challenge_votes",
    },
    ActivityDefinition {
        kind: "daily_login",
        xp: 5,
        counter: "daily_logins",
    },
    ActivityDefinition {
        kind: TASK_COMPLETION,
        xp: 0,
        counter: "tasks_completed",
    },
];

impl ActivityDefinition {
    /// Look up a known activity
    pub fn get(kind: &str) -> Option<&'static ActivityDefinition> {
        ACTIVITIES.iter().find(|a| a.kind == kind)
    }
}

/// Reward table: built-in defaults with configured overrides on top
#[derive(Debug, Clone, Default)]
pub struct RewardTable {
    overrides: HashMap<String, i64>,
}

impl RewardTable {
    pub fn new(overrides: HashMap<String, i64>) -> Self {
        Self { overrides }
    }

    /// Default XP for `kind`, `None` if the kind is unknown
    pub fn xp_for(&self, kind: &str) -> Option<i64> {
        self.overrides
            .get(kind)
            .copied()
            .or_else(|| ActivityDefinition::get(kind).map(|a| a.xp))
    }

    /// Counter name for `kind`; unknown kinds count under their own name
    pub fn counter_for<'a>(&self, kind: &'a str) -> &'a str {
        match ActivityDefinition::get(kind) {
            Some(def) => def.counter,
            None => kind,
        }
    }

    /// XP actually applied: a non-zero override wins over the table
    pub fn resolve(&self, kind: &str, xp_override: Option<i64>) -> Option<i64> {
        match xp_override {
            Some(xp) if xp != 0 => Some(xp),
            _ => self.xp_for(kind),
        }
    }
}
