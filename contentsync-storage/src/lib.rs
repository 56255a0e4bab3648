//! Local snapshot storage for contentsync.
//!
//! The content store keeps its cache and sync queue in memory and persists
//! each of them as a serialized snapshot under a fixed key. This crate
//! provides the key/value capability behind that:
//!
//! - [`FileSnapshotStore`]: one JSON file per key, replaced atomically
//! - [`SqliteSnapshotStore`]: a single `snapshots` table
//! - [`MemorySnapshotStore`]: process-local, for tests and throwaway previews
//!
//! # Contract
//!
//! `save_snapshot` returns only once the blob is durable, and
//! `load_snapshot` returns exactly the last successfully saved blob for the
//! key, or `None`.

mod error;
mod file;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;

use async_trait::async_trait;

/// Scoped key/value persistence for serialized snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn backend_name(&self) -> &'static str;

    /// Durably replaces the blob stored under `key`.
    async fn save_snapshot(&self, key: &str, blob: &str) -> StorageResult<()>;

    /// Loads the blob stored under `key`, if any.
    async fn load_snapshot(&self, key: &str) -> StorageResult<Option<String>>;
}

/// Rejects keys that are empty or could escape a directory.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
