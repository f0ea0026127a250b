//! Period keys for task rollover
//!
//! - Daily: "YYYY-MM-DD" of the UTC calendar day
//! - Weekly: "YYYY-MM-DD" of the Monday that starts the ISO week

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which task board a state belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Weekly,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily Tasks",
            Self::Weekly => "Weekly Tasks",
        }
    }

    pub fn all() -> [PeriodKind; 2] {
        [Self::Daily, Self::Weekly]
    }

    /// Period key containing `at`
    pub fn key_for(&self, at: DateTime<Utc>) -> String {
        day_key(self.start_of(at))
    }

    /// First day of the period containing `at`
    pub fn start_of(&self, at: DateTime<Utc>) -> NaiveDate {
        let date = at.date_naive();
        match self {
            Self::Daily => date,
            Self::Weekly => week_start(date),
        }
    }

    /// First day of the period a stored key names
    pub fn parse_key(key: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
    }
}

/// Format a date as a period key
fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday of the week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
