//! Local-first content store with best-effort remote sync.
//!
//! # Architecture
//!
//! The [`ContentStore`] owns a local cache of content records keyed by page
//! id and a queue of writes that still have to reach the remote. Both are
//! persisted through a [`contentsync_storage::SnapshotStore`], so neither is
//! lost across restarts.
//!
//! ## Components
//!
//! - **Remote**: the [`RemoteBackend`] trait with an HTTP implementation and
//!   a local-only one
//! - **Queue**: the FIFO backlog of undelivered writes
//! - **Store**: local cache, dual write, read-through and queue drains
//!
//! ## Write path
//!
//! 1. **Validate**: page id and required fields, before touching any state
//! 2. **Local write**: update the cache and persist its snapshot
//! 3. **Mirror**: if the remote answered its last probe, write with inline retries
//! 4. **Queue**: anything that did not get through is queued for a later drain
//!
//! # Example
//!
//! ```no_run
//! use contentsync_storage::FileSnapshotStore;
//! use contentsync_sync::{ContentStore, HttpBackend, HttpBackendConfig, StoreConfig};
//! use contentsync_types::ContentDraft;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new(HttpBackendConfig::new("http://localhost:3001"))?;
//! let store = ContentStore::new(
//!     StoreConfig::default(),
//!     Arc::new(backend),
//!     Arc::new(FileSnapshotStore::new("./cache")),
//! );
//!
//! store.initialize().await?;
//! store
//!     .put("about/welcome", ContentDraft::new("Welcome", "Who we are"))
//!     .await?;
//! println!("pending: {}", store.status().await.sync_queue_size);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod queue;
pub mod remote;
mod store;

pub use error::{StoreError, StoreResult};
pub use queue::{SyncQueue, SyncQueueEntry};
pub use remote::{
    HttpBackend, HttpBackendConfig, LocalOnlyBackend, RemoteBackend, RemoteError, RemoteResult,
    WriteAck, RETRYABLE_STATUSES,
};
pub use store::{ContentStore, StoreConfig, StoreStatus, CACHE_SNAPSHOT_KEY, QUEUE_SNAPSHOT_KEY};
