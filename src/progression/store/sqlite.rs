//! SQLite store for progression records and task boards
//!
//! Manages `~/.brigade/progression.db`; the schema is created on open and
//! its version recorded in `schema_version`.
//! Counters, achievements and task maps are kept as JSON text columns; every
//! row carries a `version` used for compare-and-set writes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, warn};

use super::{ProgressionStore, Versioned};
use crate::progression::error::StoreError;
use crate::progression::levels::clamp_xp;
use crate::progression::models::ProgressionRecord;
use crate::progression::tasks::{PeriodKind, TaskProgress, TaskState};

/// Database wrapper shared between engine clones
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    ///
    /// `busy_timeout` bounds how long a write waits for another process
    /// holding the database lock; past it the call fails as unavailable.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!(
                    "failed to create store dir {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!("failed to open {}: {e}", path.display()))
        })?;
        conn.busy_timeout(busy_timeout)?;

        // WAL lets readers (leaderboard, profile) run next to a writer
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        debug!(path = %path.display(), "progression store opened");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("progression db lock poisoned".into()))
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn decode_progression(row: &Row<'_>) -> rusqlite::Result<RawProgression> {
        Ok(RawProgression {
            user_id: row.get(0)?,
            total_xp: row.get(1)?,
            level: row.get(2)?,
            counters: row.get(3)?,
            achievements: row.get(4)?,
            last_activity_at: row.get(5)?,
            created_at: row.get(6)?,
            version: row.get(7)?,
        })
    }

    fn progression_version(conn: &Connection, user_id: &str) -> Result<Option<u64>, StoreError> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT version FROM progression WHERE user_id = ?1",
                [user_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.map(|v| v as u64))
    }

    fn tasks_version(
        conn: &Connection,
        user_id: &str,
        period: PeriodKind,
    ) -> Result<Option<u64>, StoreError> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT version FROM task_state WHERE user_id = ?1 AND period = ?2",
                params![user_id, period.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(found.map(|v| v as u64))
    }
}

/// Row as stored, before validation
struct RawProgression {
    user_id: String,
    total_xp: i64,
    level: i64,
    counters: String,
    achievements: String,
    last_activity_at: Option<i64>,
    created_at: i64,
    version: i64,
}

impl RawProgression {
    fn into_record(self) -> Result<Versioned<ProgressionRecord>, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            user_id: self.user_id.clone(),
            reason,
        };

        let raw_counters: BTreeMap<String, i64> = serde_json::from_str(&self.counters)
            .map_err(|e| corrupt(format!("counters: {e}")))?;
        let achievements: Vec<String> = serde_json::from_str(&self.achievements)
            .map_err(|e| corrupt(format!("achievements: {e}")))?;

        let activity_counters = raw_counters
            .into_iter()
            .map(|(name, count)| {
                if count < 0 {
                    warn!(user_id = %self.user_id, counter = %name, count, "negative counter clamped to 0");
                }
                (name, count.max(0) as u64)
            })
            .collect();

        let record = ProgressionRecord {
            user_id: self.user_id.clone(),
            total_xp: clamp_xp(self.total_xp),
            // Out-of-range levels are left for the engine's repair pass
            level: u32::try_from(self.level).unwrap_or(0),
            activity_counters,
            achievements_unlocked: achievements,
            last_activity_at: self.last_activity_at.and_then(DateTime::from_timestamp_millis),
            created_at: DateTime::from_timestamp_millis(self.created_at).unwrap_or_else(Utc::now),
        };

        Ok(Versioned {
            value: record,
            version: self.version.max(0) as u64,
        })
    }
}

fn to_json<T: serde::Serialize>(user_id: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        user_id: user_id.to_string(),
        reason: e.to_string(),
    })
}

impl ProgressionStore for SqliteStore {
    fn load_progression(
        &self,
        user_id: &str,
    ) -> Result<Option<Versioned<ProgressionRecord>>, StoreError> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                r#"SELECT user_id, total_xp, level, counters, achievements,
                          last_activity_at, created_at, version
                   FROM progression WHERE user_id = ?1"#,
                [user_id],
                Self::decode_progression,
            )
            .optional()?;
        drop(conn);

        raw.map(RawProgression::into_record).transpose()
    }

    fn save_progression(
        &self,
        record: &ProgressionRecord,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let counters = to_json(&record.user_id, &record.activity_counters)?;
        let achievements = to_json(&record.user_id, &record.achievements_unlocked)?;
        let total_xp = i64::try_from(record.total_xp).unwrap_or(i64::MAX);
        let last_activity = record.last_activity_at.map(|t| t.timestamp_millis());
        let now = Utc::now().timestamp_millis();

        let conn = self.conn()?;
        let changed = match expected {
            None => conn.execute(
                r#"INSERT INTO progression
                   (user_id, total_xp, level, counters, achievements,
                    last_activity_at, created_at, version, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
                   ON CONFLICT(user_id) DO NOTHING"#,
                params![
                    record.user_id, total_xp, record.level, counters, achievements,
                    last_activity, record.created_at.timestamp_millis(), now,
                ],
            )?,
            Some(version) => conn.execute(
                r#"UPDATE progression SET
                       total_xp = ?2, level = ?3, counters = ?4, achievements = ?5,
                       last_activity_at = ?6, version = version + 1, updated_at = ?7
                   WHERE user_id = ?1 AND version = ?8"#,
                params![
                    record.user_id, total_xp, record.level, counters, achievements,
                    last_activity, now, version as i64,
                ],
            )?,
        };

        if changed == 0 {
            let found = Self::progression_version(&conn, &record.user_id)?;
            return Err(StoreError::Conflict { expected, found });
        }
        Ok(expected.map_or(1, |v| v + 1))
    }

    fn load_tasks(
        &self,
        user_id: &str,
        period: PeriodKind,
    ) -> Result<Option<Versioned<TaskState>>, StoreError> {
        let conn = self.conn()?;
        let row: Option<(String, String, i64)> = conn
            .query_row(
                "SELECT period_key, tasks, version FROM task_state WHERE user_id = ?1 AND period = ?2",
                params![user_id, period.as_str()],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?;
        drop(conn);

        let Some((period_key, tasks, version)) = row else {
            return Ok(None);
        };
        let tasks: BTreeMap<String, TaskProgress> =
            serde_json::from_str(&tasks).map_err(|e| StoreError::Corrupt {
                user_id: user_id.to_string(),
                reason: format!("{} tasks: {e}", period.as_str()),
            })?;

        Ok(Some(Versioned {
            value: TaskState {
                period,
                period_key,
                tasks,
            },
            version: version.max(0) as u64,
        }))
    }

    fn save_tasks(
        &self,
        user_id: &str,
        state: &TaskState,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let tasks = to_json(user_id, &state.tasks)?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn()?;
        let changed = match expected {
            None => conn.execute(
                r#"INSERT INTO task_state (user_id, period, period_key, tasks, version, updated_at)
                   VALUES (?1, ?2, ?3, ?4, 1, ?5)
                   ON CONFLICT(user_id, period) DO NOTHING"#,
                params![user_id, state.period.as_str(), state.period_key, tasks, now],
            )?,
            Some(version) => conn.execute(
                r#"UPDATE task_state SET
                       period_key = ?3, tasks = ?4, version = version + 1, updated_at = ?5
                   WHERE user_id = ?1 AND period = ?2 AND version = ?6"#,
                params![
                    user_id, state.period.as_str(), state.period_key, tasks, now, version as i64,
                ],
            )?,
        };

        if changed == 0 {
            let found = Self::tasks_version(&conn, user_id, state.period)?;
            return Err(StoreError::Conflict { expected, found });
        }
        Ok(expected.map_or(1, |v| v + 1))
    }

    fn top_by_xp(&self, limit: usize) -> Result<Vec<ProgressionRecord>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT user_id, total_xp, level, counters, achievements,
                      last_activity_at, created_at, version
               FROM progression
               ORDER BY total_xp DESC, user_id ASC
               LIMIT ?1"#,
        )?;
        let raws: Vec<RawProgression> = stmt
            .query_map([limit as i64], Self::decode_progression)?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);
        drop(conn);

        raws.into_iter()
            .map(|raw| raw.into_record().map(|v| v.value))
            .collect()
    }
}

/// SQL schema for the progression database
const SCHEMA_SQL: &str = r#"
-- One row per user
CREATE TABLE IF NOT EXISTS progression (
    user_id TEXT PRIMARY KEY,
    total_xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    counters TEXT NOT NULL DEFAULT '{}',
    achievements TEXT NOT NULL DEFAULT '[]',
    last_activity_at INTEGER,
    created_at INTEGER NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_progression_xp ON progression(total_xp DESC);

-- Daily and weekly task boards
CREATE TABLE IF NOT EXISTS task_state (
    user_id TEXT NOT NULL,
    period TEXT NOT NULL,
    period_key TEXT NOT NULL,
    tasks TEXT NOT NULL DEFAULT '{}',
    version INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, period)
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
