//! Progression data types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::achievements::AchievementId;
use super::levels::{apply_delta, level_for_xp};
use super::tasks::PeriodKind;

/// Per-user progression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub user_id: String,
    pub total_xp: u64,
    /// Cached projection of `total_xp`, never the source of truth
    pub level: u32,
    #[serde(default)]
    pub activity_counters: BTreeMap<String, u64>,
    /// Unlocked achievement ids, in unlock order
    #[serde(default)]
    pub achievements_unlocked: Vec<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProgressionRecord {
    /// Fresh record for a user seen for the first time
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            total_xp: 0,
            level: 1,
            activity_counters: BTreeMap::new(),
            achievements_unlocked: Vec::new(),
            last_activity_at: None,
            created_at: now,
        }
    }

    /// Apply an XP delta and recompute the level (downward too)
    pub fn apply_xp(&mut self, delta: i64, now: DateTime<Utc>) {
        self.total_xp = apply_delta(self.total_xp, delta);
        self.level = level_for_xp(self.total_xp);
        self.last_activity_at = Some(now);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.activity_counters.get(name).copied().unwrap_or(0)
    }

    pub fn bump_counter(&mut self, name: &str, by: u64) -> u64 {
        let entry = self.activity_counters.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_add(by);
        *entry
    }

    pub fn has_achievement(&self, id: AchievementId) -> bool {
        self.achievements_unlocked.iter().any(|u| u == id.as_str())
    }

    /// Recompute the cached level if it drifted from `total_xp`.
    ///
    /// Returns true when the record was changed.
    pub fn repair(&mut self) -> bool {
        let expected = level_for_xp(self.total_xp);
        if self.level == expected {
            return false;
        }
        warn!(
            user_id = %self.user_id,
            stored = self.level,
            expected,
            "stored level disagrees with total XP, recomputing"
        );
        self.level = expected;
        true
    }
}

/// Optional context passed with an activity
#[derive(Debug, Clone, Default)]
pub struct AwardContext {
    /// Batched activities (e.g. five recipes generated at once)
    pub count: Option<u32>,
    /// Event time, defaults to now
    pub at: Option<DateTime<Utc>>,
}

impl AwardContext {
    pub fn count(count: u32) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            at: Some(at),
            ..Self::default()
        }
    }

    pub(crate) fn counter_step(&self) -> u64 {
        u64::from(self.count.unwrap_or(1))
    }
}

/// A task that reached its target during an award
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCompletion {
    pub period: PeriodKind,
    pub task_id: String,
    /// Outcome of the completion reward, `None` if the reward could not be applied
    pub reward: Option<Box<AwardOutcome>>,
}

/// Result of a single `award` call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AwardOutcome {
    pub xp_applied: i64,
    pub total_xp: u64,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
    pub newly_unlocked: Vec<AchievementId>,
    pub completed_tasks: Vec<TaskCompletion>,
    /// Task bookkeeping failed after XP was persisted
    pub tasks_degraded: bool,
    /// Nothing was read or written: unknown activity or an empty batch
    pub ignored: bool,
}

impl AwardOutcome {
    /// Outcome for a failed award: nothing applied
    pub fn empty() -> Self {
        Self {
            old_level: 1,
            new_level: 1,
            ..Self::default()
        }
    }

    /// Outcome for an award the engine skipped without touching the store
    pub fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::empty()
        }
    }

    /// Level after this award and any task rewards it triggered
    pub fn final_level(&self) -> u32 {
        self.completed_tasks
            .iter()
            .filter_map(|t| t.reward.as_deref())
            .map(AwardOutcome::final_level)
            .fold(self.new_level, u32::max)
    }

    /// XP applied by this award and its task rewards
    pub fn total_applied(&self) -> i64 {
        self.completed_tasks
            .iter()
            .filter_map(|t| t.reward.as_deref())
            .map(AwardOutcome::total_applied)
            .fold(self.xp_applied, i64::saturating_add)
    }
}
