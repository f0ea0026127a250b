//! Persistence collaborator for the progression engine
//!
//! The engine never writes blindly: every save carries the version it read,
//! and a store rejects the write with [`StoreError::Conflict`] when the
//! stored version moved on in the meantime.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use super::error::StoreError;
use super::models::ProgressionRecord;
use super::tasks::{PeriodKind, TaskState};

/// A stored value together with its write version
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Storage for progression records and task boards.
///
/// `expected` is the version returned by the last load, or `None` when the
/// caller believes no row exists yet. Implementations must apply the write
/// only if the stored version still equals `expected`, and return the new
/// version.
pub trait ProgressionStore: Send + Sync {
    fn load_progression(
        &self,
        user_id: &str,
    ) -> Result<Option<Versioned<ProgressionRecord>>, StoreError>;

    fn save_progression(
        &self,
        record: &ProgressionRecord,
        expected: Option<u64>,
    ) -> Result<u64, StoreError>;

    fn load_tasks(
        &self,
        user_id: &str,
        period: PeriodKind,
    ) -> Result<Option<Versioned<TaskState>>, StoreError>;

    fn save_tasks(
        &self,
        user_id: &str,
        state: &TaskState,
        expected: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// Records ordered by total XP, highest first
    fn top_by_xp(&self, limit: usize) -> Result<Vec<ProgressionRecord>, StoreError>;
}
