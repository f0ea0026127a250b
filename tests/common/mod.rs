//! Shared test utilities for progression integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use brigade::progression::store::{MemoryStore, SqliteStore};
use brigade::{AwardContext, ProgressionEngine, ProgressionRecord};

/// Engine over a fresh in-memory store
pub fn memory_engine() -> (Arc<MemoryStore>, ProgressionEngine) {
    let store = Arc::new(MemoryStore::new());
    let engine = ProgressionEngine::new(store.clone());
    (store, engine)
}

/// Temp dir holding a SQLite database, plus an engine over it
pub fn sqlite_engine() -> (TempDir, ProgressionEngine) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = open_store(&dir);
    (dir, ProgressionEngine::new(Arc::new(store)))
}

/// Open (another connection to) the database inside `dir`
pub fn open_store(dir: &TempDir) -> SqliteStore {
    SqliteStore::open(&dir.path().join("progression.db"), Duration::from_secs(5))
        .expect("Failed to open sqlite store")
}

/// Noon UTC on the given day
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn ctx(year: i32, month: u32, day: u32) -> AwardContext {
    AwardContext::at(at(year, month, day))
}

/// Record with `total_xp` already earned and its level in sync
pub fn record_with_xp(user_id: &str, total_xp: u64) -> ProgressionRecord {
    let mut record = ProgressionRecord::new(user_id, at(2024, 1, 1));
    record.total_xp = total_xp;
    record.repair();
    record
}
