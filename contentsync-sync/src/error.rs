//! Error types for the content store.

use contentsync_storage::StorageError;
use contentsync_types::ValidationError;
use thiserror::Error;

/// Result type for content store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to callers of the content store.
///
/// Remote failures never appear here: they are absorbed into the sync queue.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed page id or missing content field.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local persistence failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Returns true for validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    /// Returns true for local persistence failures.
    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}
