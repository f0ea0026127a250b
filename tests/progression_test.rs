//! End-to-end award flows against the in-memory store

mod common;

use brigade::progression::achievements::AchievementId;
use brigade::progression::store::ProgressionStore;
use brigade::progression::tasks::{PeriodKind, TaskState};
use brigade::{AwardContext, ProgressionError};

use common::{at, ctx, memory_engine, record_with_xp};

#[test]
fn test_first_recipe_for_new_user() {
    let (store, engine) = memory_engine();

    let outcome = engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 3, 4))
        .unwrap();

    assert_eq!(outcome.xp_applied, 15);
    assert_eq!(outcome.total_xp, 15);
    assert_eq!(outcome.new_level, 1);
    assert!(!outcome.leveled_up);
    assert_eq!(outcome.newly_unlocked, vec![AchievementId::FirstDish]);

    let record = store.load_progression("chef-1").unwrap().unwrap().value;
    assert_eq!(record.counter("recipes_generated"), 1);
    assert_eq!(record.achievements_unlocked, vec!["first_dish".to_string()]);
}

#[test]
fn test_override_crosses_level_boundary() {
    let (store, engine) = memory_engine();
    store.seed_progression(record_with_xp("chef-1", 95)).unwrap();

    let outcome = engine
        .award("chef-1", "quiz_completion_base", Some(10), &ctx(2024, 3, 4))
        .unwrap();

    assert_eq!(outcome.xp_applied, 10);
    assert_eq!(outcome.total_xp, 105);
    assert_eq!(outcome.old_level, 1);
    assert_eq!(outcome.new_level, 2);
    assert!(outcome.leveled_up);
}

#[test]
fn test_penalties_never_go_below_zero() {
    let (store, engine) = memory_engine();
    store.seed_progression(record_with_xp("chef-1", 50)).unwrap();

    for _ in 0..2 {
        engine
            .award("chef-1", "campaign_dislike", None, &ctx(2024, 3, 4))
            .unwrap();
    }
    assert_eq!(engine.profile("chef-1").unwrap().total_xp, 46);

    let outcome = engine
        .award("chef-1", "campaign_dislike", Some(-100), &ctx(2024, 3, 4))
        .unwrap();
    assert_eq!(outcome.xp_applied, -46);
    assert_eq!(outcome.total_xp, 0);
    assert_eq!(outcome.new_level, 1);
    assert!(!outcome.leveled_up);
}

#[test]
fn test_level_drops_but_achievements_stay() {
    let (store, engine) = memory_engine();
    store.seed_progression(record_with_xp("chef-1", 480)).unwrap();

    let up = engine
        .award("chef-1", "menu_generation", Some(30), &ctx(2024, 3, 4))
        .unwrap();
    assert_eq!(up.newly_unlocked, vec![AchievementId::KitchenRegular]);

    let down = engine
        .award("chef-1", "campaign_dislike", Some(-400), &ctx(2024, 3, 4))
        .unwrap();
    assert_eq!(down.old_level, 3);
    assert_eq!(down.new_level, 2);
    assert!(!down.leveled_up);

    let record = engine.profile("chef-1").unwrap();
    assert!(record.has_achievement(AchievementId::KitchenRegular));
}

#[test]
fn test_recipe_expert_unlocks_once() {
    let (store, engine) = memory_engine();
    let mut record = record_with_xp("chef-1", 200);
    record.bump_counter("recipes_generated", 24);
    record.achievements_unlocked.push("first_dish".to_string());
    store.seed_progression(record).unwrap();

    let outcome = engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 3, 4))
        .unwrap();
    assert_eq!(outcome.newly_unlocked, vec![AchievementId::RecipeExpert]);

    let again = engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 3, 4))
        .unwrap();
    assert!(again.newly_unlocked.is_empty());

    let stored = engine.profile("chef-1").unwrap();
    let expert = stored
        .achievements_unlocked
        .iter()
        .filter(|id| id.as_str() == "recipe_expert")
        .count();
    assert_eq!(expert, 1);
}

#[test]
fn test_daily_board_resets_on_new_day() {
    let (store, engine) = memory_engine();
    let mut board = TaskState::new(PeriodKind::Daily, at(2024, 1, 1));
    assert_eq!(board.period_key, "2024-01-01");
    board.advance("recipe_generation", 1);
    assert!(board.tasks["generate_recipe"].completed);
    store.seed_tasks("chef-1", board).unwrap();

    let outcome = engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 1, 2))
        .unwrap();

    let daily = store
        .load_tasks("chef-1", PeriodKind::Daily)
        .unwrap()
        .unwrap()
        .value;
    assert_eq!(daily.period_key, "2024-01-02");
    assert_eq!(daily.tasks["generate_recipe"].progress, 1);
    assert!(daily.tasks["generate_recipe"].completed);

    let fired: Vec<&str> = outcome
        .completed_tasks
        .iter()
        .map(|t| t.task_id.as_str())
        .collect();
    assert_eq!(fired, vec!["generate_recipe"]);
    let reward = outcome.completed_tasks[0].reward.as_ref().unwrap();
    assert_eq!(reward.xp_applied, 10);
    assert_eq!(reward.total_xp, 25);
    assert_eq!(outcome.total_applied(), 25);
}

#[test]
fn test_task_reward_fires_once_per_period() {
    let (store, engine) = memory_engine();

    let mut rewards = 0;
    for _ in 0..4 {
        let outcome = engine
            .award("chef-1", "recipe_generation", None, &ctx(2024, 1, 3))
            .unwrap();
        rewards += outcome
            .completed_tasks
            .iter()
            .filter(|t| t.task_id == "generate_recipe")
            .count();
    }
    assert_eq!(rewards, 1);

    let record = store.load_progression("chef-1").unwrap().unwrap().value;
    assert_eq!(record.counter("tasks_completed"), 1);
    assert_eq!(record.total_xp, 4 * 15 + 10);
}

#[test]
fn test_late_event_does_not_rearm_daily_reward() {
    let (store, engine) = memory_engine();

    let mut fired = 0;
    for day in [2, 1, 2] {
        let outcome = engine
            .award("chef-1", "recipe_generation", None, &ctx(2024, 1, day))
            .unwrap();
        fired += outcome
            .completed_tasks
            .iter()
            .filter(|t| t.task_id == "generate_recipe")
            .count();
    }
    assert_eq!(fired, 1);

    let daily = store
        .load_tasks("chef-1", PeriodKind::Daily)
        .unwrap()
        .unwrap()
        .value;
    assert_eq!(daily.period_key, "2024-01-02");

    // The late event still earns its own XP and counts as a recipe
    let record = engine.profile("chef-1").unwrap();
    assert_eq!(record.counter("recipes_generated"), 3);
    assert_eq!(record.counter("tasks_completed"), 1);
    assert_eq!(record.total_xp, 3 * 15 + 10);
}

#[test]
fn test_weekly_task_completes_with_batch() {
    let (_store, engine) = memory_engine();
    let context = AwardContext {
        count: Some(5),
        at: Some(at(2024, 1, 3)),
    };

    let outcome = engine
        .award("chef-1", "recipe_generation", None, &context)
        .unwrap();

    // Batches count five activities but pay the per-call XP once
    assert_eq!(outcome.xp_applied, 15);
    let mut fired: Vec<(PeriodKind, &str)> = outcome
        .completed_tasks
        .iter()
        .map(|t| (t.period, t.task_id.as_str()))
        .collect();
    fired.sort_by_key(|(_, id)| *id);
    assert_eq!(
        fired,
        vec![
            (PeriodKind::Daily, "generate_recipe"),
            (PeriodKind::Weekly, "recipe_marathon"),
        ]
    );

    let boards = engine.task_boards("chef-1", at(2024, 1, 5)).unwrap();
    let weekly = boards.iter().find(|b| b.period == PeriodKind::Weekly).unwrap();
    assert_eq!(weekly.period_key, "2024-01-01");
    assert_eq!(weekly.tasks["recipe_marathon"].progress, 5);
}

#[test]
fn test_task_boards_view_rolls_over_without_writing() {
    let (store, engine) = memory_engine();
    engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 1, 3))
        .unwrap();

    let boards = engine.task_boards("chef-1", at(2024, 1, 9)).unwrap();
    assert!(boards.iter().all(|b| b.completed_count() == 0));

    let stored = store
        .load_tasks("chef-1", PeriodKind::Daily)
        .unwrap()
        .unwrap()
        .value;
    assert_eq!(stored.period_key, "2024-01-03");
}

#[test]
fn test_xp_never_negative_across_mixed_activity() {
    let (_store, engine) = memory_engine();
    let kinds = [
        ("campaign_dislike", None),
        ("chef_recipe_dislike", None),
        ("dish_like", None),
        ("campaign_dislike", Some(-1_000)),
        ("recipe_generation", None),
        ("chef_recipe_dislike", Some(-7)),
    ];

    for (kind, xp) in kinds.iter().cycle().take(30) {
        let outcome = engine.award("chef-1", kind, *xp, &ctx(2024, 2, 1)).unwrap();
        let record = engine.profile("chef-1").unwrap();
        assert_eq!(record.total_xp, outcome.total_xp);
        assert_eq!(
            record.level,
            brigade::progression::levels::level_for_xp(record.total_xp)
        );
    }
}

#[test]
fn test_unavailable_store_reports_error() {
    let (store, engine) = memory_engine();
    store.set_unavailable(true);

    let err = engine
        .award("chef-1", "recipe_generation", None, &ctx(2024, 3, 4))
        .unwrap_err();
    assert!(matches!(err, ProgressionError::PersistenceUnavailable(_)));

    store.set_unavailable(false);
    assert!(store.load_progression("chef-1").unwrap().is_none());
}
