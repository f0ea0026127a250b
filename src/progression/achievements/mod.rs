//! Achievements: static definitions and the unlock checker

mod checker;
mod definitions;

pub use checker::{AchievementStatus, check_achievements, rule_holds, showcase, unlock_new};
pub use definitions::{ACHIEVEMENTS, Achievement, AchievementCategory, AchievementId, UnlockRule};
