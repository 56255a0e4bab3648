//! SQLite-backed snapshot store.
//!
//! Keeps every snapshot as a row of a single table, so the cache and the
//! sync queue can live in one file next to other application state.

use crate::{validate_key, SnapshotStore, StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Persistent snapshot store backed by SQLite.
pub struct SqliteSnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSnapshotStore {
    /// Opens (or creates) a snapshot database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory snapshot database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            PRAGMA synchronous = FULL;

            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                blob TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn save_snapshot(&self, key: &str, blob: &str) -> StorageResult<()> {
        validate_key(key)?;
        let updated_at = Utc::now().timestamp_millis();

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, blob, updated_at) VALUES (?1, ?2, ?3)",
            params![key, blob, updated_at],
        )?;
        Ok(())
    }

    async fn load_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        let conn = self.lock()?;
        let blob = conn
            .query_row(
                "SELECT blob FROM snapshots WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }
}
