//! Error types for the progression engine and its stores

use thiserror::Error;

/// Errors reported by a [`ProgressionStore`](super::store::ProgressionStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A compare-and-set write found a different version than expected
    #[error("write conflict: expected version {expected:?}, found {found:?}")]
    Conflict {
        expected: Option<u64>,
        found: Option<u64>,
    },

    /// A stored payload could not be decoded
    #[error("corrupt record for '{user_id}': {reason}")]
    Corrupt { user_id: String, reason: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Errors surfaced by [`ProgressionEngine`](super::engine::ProgressionEngine)
#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("progression store unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("concurrent write conflict for '{user_id}' after {attempts} attempts")]
    ConcurrentWriteConflict { user_id: String, attempts: u32 },

    #[error("corrupt progression data for '{user_id}': {reason}")]
    CorruptRecord { user_id: String, reason: String },
}

impl ProgressionError {
    pub(crate) fn from_store(err: StoreError, user_id: &str, attempts: u32) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::PersistenceUnavailable(reason),
            StoreError::Conflict { .. } => Self::ConcurrentWriteConflict {
                user_id: user_id.to_string(),
                attempts,
            },
            StoreError::Corrupt { user_id, reason } => Self::CorruptRecord { user_id, reason },
        }
    }
}

pub type Result<T, E = ProgressionError> = std::result::Result<T, E>;
