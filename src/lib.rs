//! Brigade - progression for restaurant teams
//!
//! Brigade turns what a kitchen team does in the restaurant app (generating
//! recipes and menus, keeping the inventory, taking culinary quizzes,
//! running campaigns, entering challenges) into experience points, levels,
//! achievements and daily/weekly tasks.
//!
//! ## Entry points
//!
//! 1. **Library (Primary)**: activity sources call
//!    [`ProgressionEngine::award`]; display code reads profiles, task boards,
//!    the achievement showcase and the leaderboard.
//!
//! 2. **CLI**: the `brigade` binary wraps the same engine over the SQLite
//!    store for scripting and support work.

pub mod config;
pub mod progression;

pub use config::Config;
pub use progression::{
    AwardContext, AwardOutcome, ProgressionEngine, ProgressionError, ProgressionRecord,
};
