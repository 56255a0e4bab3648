use crate::error::ApiError;
use contentsync_types::{ContentRecord, PageId};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Content records stored as `<root>/<menu>/<submenu>.json`.
pub struct ContentDir {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl ContentDir {
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the record for `page_id`.
    ///
    /// `PageId` already refuses `.` and `..`. Segments holding a backslash
    /// or NUL are refused here.
    pub fn path_for(&self, page_id: &PageId) -> Result<PathBuf, ApiError> {
        for segment in [page_id.menu(), page_id.submenu()] {
            if segment.contains(['\\', '\0']) {
                return Err(ApiError::InvalidPageId(format!(
                    "segment {segment:?} is not allowed"
                )));
            }
        }
        Ok(self
            .root
            .join(page_id.menu())
            .join(format!("{}.json", page_id.submenu())))
    }

    /// Writes a record, replacing any earlier one for the same page.
    pub async fn save(&self, record: &ContentRecord) -> Result<(), ApiError> {
        let path = self.path_for(&record.page_id)?;
        let json = serde_json::to_vec_pretty(record)?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Reads the record for `page_id`, `None` if it was never written.
    pub async fn load(&self, page_id: &PageId) -> Result<Option<ContentRecord>, ApiError> {
        let path = self.path_for(page_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}
