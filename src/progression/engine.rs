//! Progression engine - the single entry point for awarding XP
//!
//! Handles XP resolution, record updates, achievement unlocks and task
//! boards. Every write is a compare-and-set against the version that was
//! read; a lost race re-reads and recomputes, up to `max_write_retries`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::achievements::{AchievementStatus, AchievementId, showcase, unlock_new};
use super::activities::{RewardTable, TASK_COMPLETION};
use super::error::{ProgressionError, Result, StoreError};
use super::levels::{LevelProgress, DEFAULT_DISPLAY_CAP, rank_title};
use super::models::{AwardContext, AwardOutcome, ProgressionRecord, TaskCompletion};
use super::store::{ProgressionStore, Versioned};
use super::tasks::{PeriodKind, TaskDefinition, TaskState};

/// Default bound on compare-and-set retries
pub const DEFAULT_MAX_WRITE_RETRIES: u32 = 5;

/// One row of the leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    /// Competition rank: equal XP shares a rank
    pub rank: usize,
    pub user_id: String,
    pub total_xp: u64,
    pub level: u32,
    pub title: &'static str,
    pub achievements: usize,
}

/// Result of the progression part of an award
struct AppliedAward {
    xp_applied: i64,
    total_xp: u64,
    old_level: u32,
    new_level: u32,
    newly_unlocked: Vec<AchievementId>,
}

/// Main engine for all progression features
#[derive(Clone)]
pub struct ProgressionEngine {
    store: Arc<dyn ProgressionStore>,
    rewards: RewardTable,
    max_write_retries: u32,
    display_cap: u32,
}

impl ProgressionEngine {
    /// Create an engine over a store, with default rewards and limits
    pub fn new(store: Arc<dyn ProgressionStore>) -> Self {
        Self {
            store,
            rewards: RewardTable::default(),
            max_write_retries: DEFAULT_MAX_WRITE_RETRIES,
            display_cap: DEFAULT_DISPLAY_CAP,
        }
    }

    pub fn with_rewards(mut self, rewards: RewardTable) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn with_max_write_retries(mut self, retries: u32) -> Self {
        self.max_write_retries = retries;
        self
    }

    pub fn with_display_cap(mut self, cap: u32) -> Self {
        self.display_cap = cap;
        self
    }

    // ========================================
    // AWARD
    // ========================================

    /// Record that `user_id` performed `activity_kind`.
    ///
    /// A non-zero `xp_override` replaces the reward table amount. Unknown
    /// activities without an override, and batches of zero, are ignored and
    /// return an outcome with `ignored` set.
    pub fn award(
        &self,
        user_id: &str,
        activity_kind: &str,
        xp_override: Option<i64>,
        context: &AwardContext,
    ) -> Result<AwardOutcome> {
        self.award_inner(user_id, activity_kind, xp_override, context, true)
    }

    /// Like [`award`](Self::award), but a failure is logged and turned into
    /// an outcome with nothing applied.
    pub fn award_or_default(
        &self,
        user_id: &str,
        activity_kind: &str,
        xp_override: Option<i64>,
        context: &AwardContext,
    ) -> AwardOutcome {
        self.award(user_id, activity_kind, xp_override, context)
            .unwrap_or_else(|err| {
                warn!(user_id, activity_kind, error = %err, "award failed, nothing applied");
                AwardOutcome::empty()
            })
    }

    fn award_inner(
        &self,
        user_id: &str,
        activity_kind: &str,
        xp_override: Option<i64>,
        context: &AwardContext,
        advance_tasks: bool,
    ) -> Result<AwardOutcome> {
        let Some(xp) = self.rewards.resolve(activity_kind, xp_override) else {
            debug!(user_id, activity_kind, "unknown activity without XP override, ignoring");
            return Ok(AwardOutcome::ignored());
        };
        if context.count == Some(0) {
            debug!(user_id, activity_kind, "empty batch, ignoring");
            return Ok(AwardOutcome::ignored());
        }
        let at = context.at.unwrap_or_else(Utc::now);
        let step = context.counter_step();

        let applied = self.apply_to_record(user_id, activity_kind, xp, step, at)?;
        let leveled_up = applied.new_level > applied.old_level;

        debug!(
            user_id,
            activity_kind,
            xp = applied.xp_applied,
            total_xp = applied.total_xp,
            "XP awarded"
        );
        if leveled_up {
            info!(
                user_id,
                old_level = applied.old_level,
                new_level = applied.new_level,
                "level up"
            );
        }
        for id in &applied.newly_unlocked {
            info!(user_id, achievement = id.as_str(), "achievement unlocked");
        }

        let mut outcome = AwardOutcome {
            xp_applied: applied.xp_applied,
            total_xp: applied.total_xp,
            old_level: applied.old_level,
            new_level: applied.new_level,
            leveled_up,
            newly_unlocked: applied.newly_unlocked,
            completed_tasks: Vec::new(),
            tasks_degraded: false,
            ignored: false,
        };

        if advance_tasks {
            let by = context.count.unwrap_or(1);
            match self.advance_task_boards(user_id, activity_kind, by, at) {
                Ok(completed) => {
                    for (period, task_id) in completed {
                        let reward = self.reward_task(user_id, task_id, at);
                        if reward.is_none() {
                            outcome.tasks_degraded = true;
                        }
                        outcome.completed_tasks.push(TaskCompletion {
                            period,
                            task_id: task_id.to_string(),
                            reward: reward.map(Box::new),
                        });
                    }
                }
                Err(err) => {
                    warn!(user_id, activity_kind, error = %err, "task boards not updated");
                    outcome.tasks_degraded = true;
                }
            }
        }

        Ok(outcome)
    }

    /// Read-modify-write of the progression record with bounded retries
    fn apply_to_record(
        &self,
        user_id: &str,
        activity_kind: &str,
        xp: i64,
        step: u64,
        at: DateTime<Utc>,
    ) -> Result<AppliedAward> {
        let counter = self.rewards.counter_for(activity_kind);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let loaded = self
                .store
                .load_progression(user_id)
                .map_err(|e| ProgressionError::from_store(e, user_id, attempts))?;

            let (mut record, expected) = match loaded {
                Some(Versioned { value, version }) => (value, Some(version)),
                None => (ProgressionRecord::new(user_id, at), None),
            };
            record.repair();

            let old_total = record.total_xp;
            let old_level = record.level;
            record.apply_xp(xp, at);
            record.bump_counter(counter, step);
            let newly_unlocked = unlock_new(&mut record);

            match self.store.save_progression(&record, expected) {
                Ok(_) => {
                    return Ok(AppliedAward {
                        xp_applied: record.total_xp as i64 - old_total as i64,
                        total_xp: record.total_xp,
                        old_level,
                        new_level: record.level,
                        newly_unlocked,
                    });
                }
                Err(StoreError::Conflict { .. }) if attempts <= self.max_write_retries => {
                    debug!(user_id, attempts, "progression write lost a race, retrying");
                }
                Err(err) => return Err(ProgressionError::from_store(err, user_id, attempts)),
            }
        }
    }

    /// Roll over and advance both boards, returning tasks that just completed
    fn advance_task_boards(
        &self,
        user_id: &str,
        activity_kind: &str,
        by: u32,
        at: DateTime<Utc>,
    ) -> Result<Vec<(PeriodKind, &'static str)>> {
        let mut completed = Vec::new();
        for period in PeriodKind::all() {
            completed.extend(
                self.advance_board(user_id, period, activity_kind, by, at)?
                    .into_iter()
                    .map(|id| (period, id)),
            );
        }
        Ok(completed)
    }

    fn advance_board(
        &self,
        user_id: &str,
        period: PeriodKind,
        activity_kind: &str,
        by: u32,
        at: DateTime<Utc>,
    ) -> Result<Vec<&'static str>> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let loaded = self
                .store
                .load_tasks(user_id, period)
                .map_err(|e| ProgressionError::from_store(e, user_id, attempts))?;

            let (mut state, expected) = match loaded {
                Some(Versioned { value, version }) => (value, Some(version)),
                None => (TaskState::new(period, at), None),
            };

            if state.is_ahead_of(at) {
                debug!(user_id, period = period.as_str(), key = %state.period_key, "event predates task board, skipping");
                return Ok(Vec::new());
            }
            let rolled_over = state.roll_over(at);
            if rolled_over {
                debug!(user_id, period = period.as_str(), key = %state.period_key, "task board rolled over");
            }
            if !rolled_over && expected.is_some() && !state.tracks(activity_kind) {
                return Ok(Vec::new());
            }
            let completed = state.advance(activity_kind, by);

            match self.store.save_tasks(user_id, &state, expected) {
                Ok(_) => return Ok(completed),
                Err(StoreError::Conflict { .. }) if attempts <= self.max_write_retries => {
                    debug!(user_id, attempts, "task board write lost a race, retrying");
                }
                Err(err) => return Err(ProgressionError::from_store(err, user_id, attempts)),
            }
        }
    }

    /// Fire a completed task's reward; `None` if it could not be applied
    fn reward_task(&self, user_id: &str, task_id: &str, at: DateTime<Utc>) -> Option<AwardOutcome> {
        let def = TaskDefinition::get(task_id)?;
        info!(user_id, task = task_id, xp = def.xp_reward, "task completed");

        let context = AwardContext::at(at);
        match self.award_inner(user_id, TASK_COMPLETION, Some(def.xp_reward), &context, false) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(user_id, task = task_id, error = %err, "task reward not applied");
                None
            }
        }
    }

    // ========================================
    // READS (display side)
    // ========================================

    /// Current record for a user, or a fresh one if none is stored (not persisted)
    pub fn profile(&self, user_id: &str) -> Result<ProgressionRecord> {
        let loaded = self
            .store
            .load_progression(user_id)
            .map_err(|e| ProgressionError::from_store(e, user_id, 1))?;

        let mut record = match loaded {
            Some(versioned) => versioned.value,
            None => ProgressionRecord::new(user_id, Utc::now()),
        };
        record.repair();
        Ok(record)
    }

    /// Level bar for a user
    pub fn level_progress(&self, user_id: &str) -> Result<LevelProgress> {
        let record = self.profile(user_id)?;
        Ok(LevelProgress::with_display_cap(record.total_xp, self.display_cap))
    }

    /// Daily and weekly boards as they stand at `at` (rolled over in memory only)
    pub fn task_boards(&self, user_id: &str, at: DateTime<Utc>) -> Result<Vec<TaskState>> {
        PeriodKind::all()
            .into_iter()
            .map(|period| {
                let loaded = self
                    .store
                    .load_tasks(user_id, period)
                    .map_err(|e| ProgressionError::from_store(e, user_id, 1))?;
                let mut state = match loaded {
                    Some(versioned) => versioned.value,
                    None => TaskState::new(period, at),
                };
                state.roll_over(at);
                Ok(state)
            })
            .collect()
    }

    /// Every achievement with its unlocked flag and progress for a user
    pub fn achievement_showcase(&self, user_id: &str) -> Result<Vec<AchievementStatus>> {
        Ok(showcase(&self.profile(user_id)?))
    }

    /// Top users by XP
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let records = self
            .store
            .top_by_xp(limit)
            .map_err(|e| ProgressionError::from_store(e, "*", 1))?;

        let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(records.len());
        for (index, mut record) in records.into_iter().enumerate() {
            record.repair();
            let rank = match entries.last() {
                Some(prev) if prev.total_xp == record.total_xp => prev.rank,
                _ => index + 1,
            };
            entries.push(LeaderboardEntry {
                rank,
                title: rank_title(record.level),
                level: record.level.min(self.display_cap.max(1)),
                total_xp: record.total_xp,
                achievements: record.achievements_unlocked.len(),
                user_id: record.user_id,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::store::MemoryStore;
    use chrono::TimeZone;

    fn engine() -> (Arc<MemoryStore>, ProgressionEngine) {
        let store = Arc::new(MemoryStore::new());
        let engine = ProgressionEngine::new(store.clone());
        (store, engine)
    }

    fn jan(day: u32) -> AwardContext {
        AwardContext::at(Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_first_award_creates_record() {
        let (store, engine) = engine();
        let outcome = engine
            .award("u1", "recipe_generation", None, &jan(1))
            .unwrap();

        assert_eq!(outcome.xp_applied, 15);
        assert_eq!(outcome.old_level, 1);
        assert_eq!(outcome.new_level, 1);
        assert!(!outcome.leveled_up);

        let stored = store.load_progression("u1").unwrap().unwrap().value;
        assert_eq!(stored.total_xp, 15);
        assert_eq!(stored.counter("recipes_generated"), 1);
        assert!(stored.last_activity_at.is_some());
    }

    #[test]
    fn test_unknown_activity_is_a_noop() {
        let (store, engine) = engine();
        let outcome = engine.award("u1", "juggling", None, &jan(1)).unwrap();
        assert_eq!(outcome.xp_applied, 0);
        assert!(outcome.ignored);
        assert!(store.load_progression("u1").unwrap().is_none());
        assert!(store.load_tasks("u1", PeriodKind::Daily).unwrap().is_none());
    }

    #[test]
    fn test_unknown_activity_with_override_counts() {
        let (store, engine) = engine();
        let outcome = engine
            .award("u1", "catering_order", Some(12), &jan(1))
            .unwrap();
        assert_eq!(outcome.xp_applied, 12);
        let stored = store.load_progression("u1").unwrap().unwrap().value;
        assert_eq!(stored.counter("catering_order"), 1);
    }

    #[test]
    fn test_batch_count_increments_counter() {
        let (store, engine) = engine();
        engine
            .award("u1", "recipe_generation", None, &AwardContext::count(5))
            .unwrap();
        let stored = store.load_progression("u1").unwrap().unwrap().value;
        assert_eq!(stored.counter("recipes_generated"), 5);
    }

    #[test]
    fn test_empty_batch_is_ignored() {
        let (store, engine) = engine();
        let context = AwardContext {
            count: Some(0),
            ..jan(1)
        };
        let outcome = engine
            .award("u1", "recipe_generation", None, &context)
            .unwrap();
        assert!(outcome.ignored);
        assert_eq!(outcome.xp_applied, 0);
        assert!(store.load_progression("u1").unwrap().is_none());
        assert!(store.load_tasks("u1", PeriodKind::Daily).unwrap().is_none());
    }

    #[test]
    fn test_penalty_at_zero_is_recorded() {
        let (store, engine) = engine();
        let outcome = engine
            .award("u1", "campaign_dislike", None, &jan(1))
            .unwrap();
        assert!(!outcome.ignored);
        assert_eq!(outcome.xp_applied, 0);
        let stored = store.load_progression("u1").unwrap().unwrap().value;
        assert_eq!(stored.counter("campaign_dislikes"), 1);
    }

    #[test]
    fn test_failed_task_reward_is_not_refired() {
        let (store, engine) = engine();
        // The activity write goes through, the task reward write does not
        store.fail_progression_writes_after(1).unwrap();

        let outcome = engine
            .award("u1", "recipe_generation", None, &jan(1))
            .unwrap();
        assert!(!outcome.ignored);
        assert!(outcome.tasks_degraded);
        assert_eq!(outcome.xp_applied, 15);
        assert_eq!(outcome.completed_tasks.len(), 1);
        assert_eq!(outcome.completed_tasks[0].task_id, "generate_recipe");
        assert!(outcome.completed_tasks[0].reward.is_none());

        let daily = store.load_tasks("u1", PeriodKind::Daily).unwrap().unwrap().value;
        assert!(daily.tasks["generate_recipe"].completed);

        store.allow_progression_writes().unwrap();
        let again = engine
            .award("u1", "recipe_generation", None, &jan(1))
            .unwrap();
        assert!(again.completed_tasks.is_empty());
        assert!(!again.tasks_degraded);

        let stored = store.load_progression("u1").unwrap().unwrap().value;
        assert_eq!(stored.total_xp, 30);
        assert_eq!(stored.counter("tasks_completed"), 0);
    }

    #[test]
    fn test_conflicts_are_retried() {
        let (store, engine) = engine();
        engine.award("u1", "daily_login", None, &jan(1)).unwrap();
        store.inject_conflicts(3);
        let outcome = engine.award("u1", "daily_login", None, &jan(1)).unwrap();
        assert_eq!(outcome.total_xp, 10);
    }

    #[test]
    fn test_conflicts_past_the_bound_surface() {
        let (store, engine) = engine();
        let engine = engine.with_max_write_retries(2);
        store.inject_conflicts(10);
        let err = engine.award("u1", "daily_login", None, &jan(1)).unwrap_err();
        assert!(matches!(
            err,
            ProgressionError::ConcurrentWriteConflict { attempts: 3, .. }
        ));
        store.inject_conflicts(0);
        assert!(store.load_progression("u1").unwrap().is_none());
    }

    #[test]
    fn test_unavailable_store_fails_without_credit() {
        let (store, engine) = engine();
        store.set_unavailable(true);
        let err = engine
            .award("u1", "recipe_generation", None, &jan(1))
            .unwrap_err();
        assert!(matches!(err, ProgressionError::PersistenceUnavailable(_)));

        let outcome = engine.award_or_default("u1", "recipe_generation", None, &jan(1));
        assert_eq!(outcome.xp_applied, 0);
        assert!(!outcome.leveled_up);
        assert!(outcome.newly_unlocked.is_empty());
    }

    #[test]
    fn test_task_failure_degrades_but_keeps_xp() {
        let (store, engine) = engine();
        store.set_tasks_unavailable(true);
        let outcome = engine
            .award("u1", "recipe_generation", None, &jan(1))
            .unwrap();
        assert!(outcome.tasks_degraded);
        assert_eq!(outcome.xp_applied, 15);
        assert_eq!(store.load_progression("u1").unwrap().unwrap().value.total_xp, 15);
    }

    #[test]
    fn test_corrupt_level_is_repaired_on_award() {
        let (store, engine) = engine();
        let mut record = ProgressionRecord::new("u1", Utc::now());
        record.total_xp = 450;
        record.level = 9;
        store.seed_progression(record).unwrap();

        let outcome = engine.award("u1", "daily_login", None, &jan(1)).unwrap();
        assert_eq!(outcome.old_level, 3);
        assert_eq!(outcome.new_level, 3);
        assert!(!outcome.leveled_up);
    }

    #[test]
    fn test_leaderboard_shares_ranks() {
        let (_store, engine) = engine();
        engine.award("ana", "menu_generation", None, &jan(1)).unwrap();
        engine.award("ben", "menu_generation", None, &jan(1)).unwrap();
        engine.award("cho", "daily_login", None, &jan(1)).unwrap();

        let board = engine.leaderboard(10).unwrap();
        let ranks: Vec<(usize, &str)> = board.iter().map(|e| (e.rank, e.user_id.as_str())).collect();
        assert_eq!(ranks, vec![(1, "ana"), (1, "ben"), (3, "cho")]);
    }

    #[test]
    fn test_profile_does_not_persist() {
        let (store, engine) = engine();
        let record = engine.profile("ghost").unwrap();
        assert_eq!(record.level, 1);
        assert!(store.load_progression("ghost").unwrap().is_none());
    }
}
