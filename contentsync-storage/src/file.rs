//! File-backed snapshot store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a sibling temp file
//! that is fsynced and then renamed over the target, so a crash leaves
//! either the old or the new snapshot, never a torn one.

use crate::{validate_key, SnapshotStore, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Snapshot store that keeps one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the snapshot files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn save_snapshot(&self, key: &str, blob: &str) -> StorageResult<()> {
        validate_key(key)?;
        fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(blob.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &target).await?;
        debug!("Saved snapshot {} ({} bytes) to {:?}", key, blob.len(), target);
        Ok(())
    }

    async fn load_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
