//! XP and Level system
//!
//! One leveling curve for the whole crate: the engine, the display helpers,
//! the leaderboard and the CLI all go through these functions.
//!
//! ```text
//! level(xp)                 = floor(sqrt(xp / 100)) + 1
//! xp_required_for_level(L)  = (L - 1)^2 * 100
//! ```

use serde::Serialize;
use tracing::warn;

/// XP granularity of the curve
const XP_PER_STEP: u64 = 100;

/// Highest total XP a record can hold (the store keeps XP as a signed 64-bit integer)
pub const MAX_TOTAL_XP: u64 = i64::MAX as u64;

/// Default cap applied when a level is shown to a user
pub const DEFAULT_DISPLAY_CAP: u32 = 100;

/// Level reached with `total_xp` cumulative XP
pub fn level_for_xp(total_xp: u64) -> u32 {
    let steps = total_xp / XP_PER_STEP;
    // isqrt(u64::MAX / 100) + 1 fits comfortably in a u32
    (steps.isqrt() + 1) as u32
}

/// Cumulative XP needed to reach `level`
pub fn xp_required_for_level(level: u32) -> u64 {
    let base = u64::from(level.saturating_sub(1));
    base.saturating_mul(base).saturating_mul(XP_PER_STEP)
}

/// XP earned since the start of the current level
pub fn progress_within_level(total_xp: u64) -> u64 {
    total_xp - xp_required_for_level(level_for_xp(total_xp))
}

/// XP still missing before the next level
pub fn xp_to_next_level(total_xp: u64) -> u64 {
    xp_required_for_level(level_for_xp(total_xp) + 1).saturating_sub(total_xp)
}

/// Convert a raw stored XP value into the XP domain.
///
/// Negative values are invalid: they are clamped to 0 and a warning is logged.
pub fn clamp_xp(raw: i64) -> u64 {
    if raw < 0 {
        warn!(raw, "negative total XP rejected, clamping to 0");
        0
    } else {
        raw as u64
    }
}

/// Apply a signed delta to a total, never going below 0 nor above [`MAX_TOTAL_XP`]
pub fn apply_delta(total_xp: u64, delta: i64) -> u64 {
    let total = total_xp.min(MAX_TOTAL_XP) as i64;
    total.saturating_add(delta).clamp(0, i64::MAX) as u64
}

/// Rank titles by level band (must be sorted by `min_level`)
static RANKS: &[(u32, &str)] = &[
    (1, "Dishwasher"),
    (3, "Prep Cook"),
    (5, "Line Cook"),
    (8, "Station Chef"),
    (12, "Sous Chef"),
    (18, "Head Chef"),
    (25, "Executive Chef"),
    (40, "Culinary Legend"),
];

/// Title shown next to a level
pub fn rank_title(level: u32) -> &'static str {
    RANKS
        .iter()
        .rev()
        .find(|(min_level, _)| level >= *min_level)
        .map(|(_, title)| *title)
        .unwrap_or(RANKS[0].1)
}

/// Everything a display needs to render a level bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub total_xp: u64,
    pub level: u32,
    /// Level shown to the user (capped, the underlying level is not)
    pub display_level: u32,
    pub title: &'static str,
    /// XP earned inside the current level
    pub xp_into_level: u64,
    /// XP width of the current level
    pub level_span: u64,
    pub xp_to_next: u64,
}

impl LevelProgress {
    pub fn new(total_xp: u64) -> Self {
        Self::with_display_cap(total_xp, DEFAULT_DISPLAY_CAP)
    }

    pub fn with_display_cap(total_xp: u64, display_cap: u32) -> Self {
        let level = level_for_xp(total_xp);
        let floor = xp_required_for_level(level);
        let ceiling = xp_required_for_level(level + 1);

        Self {
            total_xp,
            level,
            display_level: level.min(display_cap.max(1)),
            title: rank_title(level),
            xp_into_level: total_xp - floor,
            level_span: ceiling - floor,
            xp_to_next: ceiling.saturating_sub(total_xp),
        }
    }

    /// Calculate progress percentage to next level (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.level_span == 0 {
            1.0
        } else {
            (self.xp_into_level as f64 / self.level_span as f64) as f32
        }
    }
}
