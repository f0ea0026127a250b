//! Gamification core: XP, levels, achievements and task boards
//!
//! Activity sources (recipe generation, quizzes, campaigns, challenges...)
//! report what a user did through [`ProgressionEngine::award`]; display code
//! only reads records and the pure functions in [`levels`].
//!
//! # Usage
//!
//! ```ignore
//! let store = Arc::new(SqliteStore::open(&path, Duration::from_secs(2))?);
//! let engine = ProgressionEngine::new(store);
//!
//! let outcome = engine.award("u1", "recipe_generation", None, &AwardContext::default())?;
//! if outcome.leveled_up {
//!     println!("Level {}!", outcome.new_level);
//! }
//! ```

pub mod achievements;
pub mod activities;
mod engine;
mod error;
pub mod levels;
mod models;
pub mod store;
pub mod tasks;

pub use engine::{DEFAULT_MAX_WRITE_RETRIES, LeaderboardEntry, ProgressionEngine};
pub use error::{ProgressionError, StoreError};
pub use models::{AwardContext, AwardOutcome, ProgressionRecord, TaskCompletion};

use std::sync::Arc;

use crate::config::Config;
use activities::RewardTable;
use store::SqliteStore;

/// Open the configured SQLite store and build an engine over it
pub fn open_engine(config: &Config) -> Result<ProgressionEngine, ProgressionError> {
    let path = config.store.resolved_path();
    let store = SqliteStore::open(&path, config.store.busy_timeout())
        .map_err(|e| ProgressionError::from_store(e, "*", 1))?;

    Ok(ProgressionEngine::new(Arc::new(store))
        .with_rewards(RewardTable::new(config.rewards.clone()))
        .with_max_write_retries(config.engine.max_write_retries)
        .with_display_cap(config.engine.display_level_cap))
}
