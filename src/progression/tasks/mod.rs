//! Daily and weekly task boards
//!
//! Each user has one board per [`PeriodKind`]. A board whose `period_key` is
//! older than the current period is reset lazily, at the next write. Boards
//! never move backwards: events dated before the board's period leave it alone.

mod definitions;
mod period;

pub use definitions::{TASKS, TaskDefinition};
pub use period::PeriodKind;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one task within the current period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
}

impl TaskProgress {
    fn fresh(target: u32) -> Self {
        Self {
            progress: 0,
            target: target.max(1),
            completed: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.progress > 0
    }
}

/// One user's board for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub period: PeriodKind,
    pub period_key: String,
    pub tasks: BTreeMap<String, TaskProgress>,
}

impl TaskState {
    /// Empty board for the period containing `at`
    pub fn new(period: PeriodKind, at: DateTime<Utc>) -> Self {
        let mut state = Self {
            period,
            period_key: period.key_for(at),
            tasks: BTreeMap::new(),
        };
        state.sync_definitions();
        state
    }

    /// `at` falls in a later period than this board
    pub fn is_stale(&self, at: DateTime<Utc>) -> bool {
        match PeriodKind::parse_key(&self.period_key) {
            Some(start) => self.period.start_of(at) > start,
            None => true,
        }
    }

    /// `at` falls in an earlier period than this board
    pub fn is_ahead_of(&self, at: DateTime<Utc>) -> bool {
        PeriodKind::parse_key(&self.period_key)
            .is_some_and(|start| self.period.start_of(at) < start)
    }

    /// Reset the board if `at` falls in a later period.
    ///
    /// Returns true when the board was reset.
    pub fn roll_over(&mut self, at: DateTime<Utc>) -> bool {
        let reset = self.is_stale(at);
        if reset {
            self.period_key = self.period.key_for(at);
            self.tasks.clear();
        }
        self.sync_definitions();
        reset
    }

    /// Make sure every task on this board has an entry
    fn sync_definitions(&mut self) {
        for def in TaskDefinition::for_period(self.period) {
            self.tasks
                .entry(def.id.to_string())
                .or_insert_with(|| TaskProgress::fresh(def.target));
        }
    }

    /// Advance tasks driven by `activity` and return the ids that just completed
    pub fn advance(&mut self, activity: &str, by: u32) -> Vec<&'static str> {
        let mut completed = Vec::new();
        if by == 0 {
            return completed;
        }

        for def in TaskDefinition::for_period(self.period).filter(|d| d.activity == activity) {
            let task = self
                .tasks
                .entry(def.id.to_string())
                .or_insert_with(|| TaskProgress::fresh(def.target));
            if task.completed {
                continue;
            }
            task.progress = task.progress.saturating_add(by).min(task.target);
            if task.progress >= task.target {
                task.completed = true;
                completed.push(def.id);
            }
        }

        completed
    }

    /// Whether any task on this board reacts to `activity`
    pub fn tracks(&self, activity: &str) -> bool {
        TaskDefinition::for_period(self.period).any(|d| d.activity == activity)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.values().filter(|t| t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_board_has_every_task() {
        let state = TaskState::new(PeriodKind::Daily, day(2024, 1, 1));
        assert_eq!(state.period_key, "2024-01-01");
        assert_eq!(state.tasks.len(), 3);
        assert!(state.tasks.values().all(|t| t.progress == 0 && !t.completed));
    }

    #[test]
    fn test_advance_completes_once() {
        let mut state = TaskState::new(PeriodKind::Daily, day(2024, 1, 1));
        assert_eq!(state.advance("inventory_update", 1), Vec::<&str>::new());
        assert_eq!(state.advance("inventory_update", 1), Vec::<&str>::new());
        assert_eq!(state.advance("inventory_update", 1), vec!["update_inventory"]);
        for _ in 0..3 {
            assert!(state.advance("inventory_update", 1).is_empty());
        }
        let task = &state.tasks["update_inventory"];
        assert_eq!(task.progress, 3);
        assert!(task.completed);
    }

    #[test]
    fn test_batch_advance_caps_at_target() {
        let mut state = TaskState::new(PeriodKind::Weekly, day(2024, 1, 3));
        assert_eq!(state.advance("recipe_generation", 8), vec!["recipe_marathon"]);
        assert_eq!(state.tasks["recipe_marathon"].progress, 5);
    }

    #[test]
    fn test_roll_over_resets_stale_board() {
        let mut state = TaskState::new(PeriodKind::Daily, day(2024, 1, 1));
        state.advance("recipe_generation", 1);
        assert!(state.tasks["generate_recipe"].completed);

        assert!(!state.roll_over(day(2024, 1, 1)));
        assert!(state.tasks["generate_recipe"].completed);

        assert!(state.roll_over(day(2024, 1, 2)));
        assert_eq!(state.period_key, "2024-01-02");
        let task = &state.tasks["generate_recipe"];
        assert_eq!(task.progress, 0);
        assert!(!task.completed);
    }

    #[test]
    fn test_earlier_event_does_not_reset() {
        let mut state = TaskState::new(PeriodKind::Daily, day(2024, 1, 2));
        state.advance("recipe_generation", 1);

        assert!(state.is_ahead_of(day(2024, 1, 1)));
        assert!(!state.is_stale(day(2024, 1, 1)));
        assert!(!state.roll_over(day(2024, 1, 1)));
        assert_eq!(state.period_key, "2024-01-02");
        assert!(state.tasks["generate_recipe"].completed);
    }

    #[test]
    fn test_unreadable_key_is_stale() {
        let mut state = TaskState::new(PeriodKind::Daily, day(2024, 1, 2));
        state.period_key = "garbage".to_string();
        assert!(!state.is_ahead_of(day(2024, 1, 2)));
        assert!(state.roll_over(day(2024, 1, 2)));
        assert_eq!(state.period_key, "2024-01-02");
    }

    #[test]
    fn test_weekly_board_survives_within_week() {
        let mut state = TaskState::new(PeriodKind::Weekly, day(2024, 1, 1));
        state.advance("campaign_creation", 1);
        assert!(!state.roll_over(day(2024, 1, 7)));
        assert_eq!(state.tasks["launch_campaigns"].progress, 1);
        assert!(state.roll_over(day(2024, 1, 8)));
        assert_eq!(state.tasks["launch_campaigns"].progress, 0);
    }

    #[test]
    fn test_untracked_activity_is_ignored() {
        let mut state = TaskState::new(PeriodKind::Daily, day(2024, 1, 1));
        assert!(!state.tracks("campaign_dislike"));
        assert!(state.advance("campaign_dislike", 1).is_empty());
    }
}
