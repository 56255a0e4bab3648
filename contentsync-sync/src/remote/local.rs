//! Local-only backend.
//!
//! Plugging this into a content store yields purely local behaviour: no
//! health probe, no remote reads, and no sync queue growth.

use super::backend::{RemoteBackend, RemoteError, RemoteResult, WriteAck};
use async_trait::async_trait;
use contentsync_types::{ContentRecord, PageId};

/// A backend that mirrors nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnlyBackend;

#[async_trait]
impl RemoteBackend for LocalOnlyBackend {
    fn name(&self) -> &'static str {
        "local-only"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn health_check(&self) -> RemoteResult<()> {
        Err(RemoteError::Unavailable("local-only backend".to_string()))
    }

    async fn write(&self, _record: &ContentRecord) -> RemoteResult<WriteAck> {
        Err(RemoteError::Unavailable("local-only backend".to_string()))
    }

    async fn read(&self, _page_id: &PageId) -> RemoteResult<Option<ContentRecord>> {
        Ok(None)
    }
}
