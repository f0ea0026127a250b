//! Achievement checking logic
//!
//! Every definition is checked on every award. A rule that holds for an id
//! not yet in the record's unlocked list is a new unlock; ids already in the
//! list are never revisited, so a later penalty cannot revoke them.

use serde::Serialize;

use super::definitions::{ACHIEVEMENTS, Achievement, AchievementId, UnlockRule};
use crate::progression::models::ProgressionRecord;

/// Whether a rule holds for the record's current values
pub fn rule_holds(rule: &UnlockRule, record: &ProgressionRecord) -> bool {
    current_value(rule, record) >= rule.threshold()
}

fn current_value(rule: &UnlockRule, record: &ProgressionRecord) -> u64 {
    match rule {
        UnlockRule::Xp { .. } => record.total_xp,
        UnlockRule::Counter { counter, .. } => record.counter(counter),
    }
}

/// Achievements satisfied by `record` that it has not unlocked yet
pub fn check_achievements(record: &ProgressionRecord) -> Vec<AchievementId> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !record.has_achievement(a.id) && rule_holds(&a.rule, record))
        .map(|a| a.id)
        .collect()
}

/// Append newly satisfied achievements to the record and return them
pub fn unlock_new(record: &mut ProgressionRecord) -> Vec<AchievementId> {
    let newly_unlocked = check_achievements(record);
    record
        .achievements_unlocked
        .extend(newly_unlocked.iter().map(|id| id.as_str().to_string()));
    newly_unlocked
}

/// One row of an achievement showcase
#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub achievement: &'static Achievement,
    pub unlocked: bool,
    /// Current value towards the threshold, capped at the threshold
    pub progress: u64,
}

impl AchievementStatus {
    pub fn progress_percent(&self) -> f32 {
        let target = self.achievement.rule.threshold();
        if self.unlocked || target == 0 {
            100.0
        } else {
            (self.progress as f32 / target as f32) * 100.0
        }
    }
}

/// Every achievement with its state for `record`, in definition order
pub fn showcase(record: &ProgressionRecord) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementStatus {
            achievement,
            unlocked: record.has_achievement(achievement.id),
            progress: current_value(&achievement.rule, record).min(achievement.rule.threshold()),
        })
        .collect()
}
