//! Content store: local cache with best-effort remote mirroring.
//!
//! Every write lands in the local cache and is persisted as a snapshot
//! before anything else happens. The store then tries to mirror it through
//! its [`RemoteBackend`]; writes that do not get through are kept in a
//! [`SyncQueue`] and delivered by later drains.
//!
//! Locks on the cache and the queue are only ever held for in-memory
//! mutation, never across a network call. Snapshot writes are serialized
//! per snapshot so the newest state is always the last one written.

use crate::error::StoreResult;
use crate::queue::{SyncQueue, SyncQueueEntry};
use crate::remote::{LocalOnlyBackend, RemoteBackend, RemoteResult, WriteAck};
use chrono::{DateTime, Utc};
use contentsync_storage::{SnapshotStore, StorageResult};
use contentsync_types::{ContentDraft, ContentRecord, PageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Snapshot key of the local content cache.
pub const CACHE_SNAPSHOT_KEY: &str = "content-cache";

/// Snapshot key of the sync queue.
pub const QUEUE_SNAPSHOT_KEY: &str = "sync-queue";

/// Retry configuration for the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Remote write attempts made inline by `put` before queueing.
    pub max_write_attempts: u32,
    /// Failed drain attempts after which a queued entry is dropped.
    pub max_queue_attempts: u32,
    /// Base delay between inline attempts (ms); attempt `n` waits `n × base`.
    pub retry_base_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 3,
            max_queue_attempts: 3,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl StoreConfig {
    /// Short inline retries for interactive editing; the queue picks up the rest.
    pub fn for_interactive() -> Self {
        Self {
            max_write_attempts: 2,
            max_queue_attempts: 3,
            retry_base_delay_ms: 100,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Reachability and backlog, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    /// Result of the last explicit health probe.
    pub remote_available: bool,
    /// Writes still waiting for the remote.
    pub sync_queue_size: usize,
    /// Pages held in the local cache.
    pub cached_pages: usize,
    /// When the remote was last probed.
    pub last_probe_at: Option<DateTime<Utc>>,
    /// Name of the remote backend.
    pub backend: String,
}

#[derive(Debug, Default)]
struct Reachability {
    remote_available: bool,
    last_probe_at: Option<DateTime<Utc>>,
}

/// Resets the drain flag when a drain pass ends, however it ends.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Local-first content store with best-effort remote sync.
pub struct ContentStore {
    config: StoreConfig,
    backend: Arc<dyn RemoteBackend>,
    snapshots: Arc<dyn SnapshotStore>,
    cache: RwLock<BTreeMap<PageId, ContentRecord>>,
    queue: RwLock<SyncQueue>,
    reachability: RwLock<Reachability>,
    cache_persist: Mutex<()>,
    queue_persist: Mutex<()>,
    draining: AtomicBool,
}

impl ContentStore {
    /// Creates a store mirroring to `backend` and persisting to `snapshots`.
    ///
    /// The store starts with an empty cache and the remote marked
    /// unavailable; call [`ContentStore::initialize`] before use.
    pub fn new(
        config: StoreConfig,
        backend: Arc<dyn RemoteBackend>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            config,
            backend,
            snapshots,
            cache: RwLock::new(BTreeMap::new()),
            queue: RwLock::new(SyncQueue::new()),
            reachability: RwLock::new(Reachability::default()),
            cache_persist: Mutex::new(()),
            queue_persist: Mutex::new(()),
            draining: AtomicBool::new(false),
        }
    }

    /// Creates a store that never talks to a remote.
    pub fn local_only(snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self::new(StoreConfig::default(), Arc::new(LocalOnlyBackend), snapshots)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Loads persisted state, probes the remote and, if it is reachable,
    /// drains the sync queue.
    ///
    /// Probe and load problems degrade (remote unavailable, empty cache or
    /// queue); only a failure to persist the queue during the drain is
    /// returned.
    pub async fn initialize(&self) -> StoreResult<StoreStatus> {
        self.load_snapshots().await;

        if self.probe().await {
            self.drain_sync_queue().await?;
        }

        let status = self.status().await;
        info!(
            "Content store ready: {} cached pages, {} queued writes, remote {} ({})",
            status.cached_pages,
            status.sync_queue_size,
            if status.remote_available { "available" } else { "unavailable" },
            status.backend
        );
        Ok(status)
    }

    /// Re-probes the remote and drains the queue if it came back.
    pub async fn reconnect(&self) -> StoreResult<StoreStatus> {
        if self.probe().await {
            self.drain_sync_queue().await?;
        }
        Ok(self.status().await)
    }

    /// Current reachability and backlog.
    pub async fn status(&self) -> StoreStatus {
        let (remote_available, last_probe_at) = {
            let r = self.reachability.read().await;
            (r.remote_available, r.last_probe_at)
        };
        StoreStatus {
            remote_available,
            sync_queue_size: self.queue.read().await.len(),
            cached_pages: self.cache.read().await.len(),
            last_probe_at,
            backend: self.backend.name().to_string(),
        }
    }

    /// Whether the last probe found the remote reachable.
    pub async fn is_remote_available(&self) -> bool {
        self.reachability.read().await.remote_available
    }

    async fn probe(&self) -> bool {
        if !self.backend.is_enabled() {
            return false;
        }

        let available = match self.backend.health_check().await {
            Ok(()) => {
                info!("Remote backend {} is reachable", self.backend.name());
                true
            }
            Err(e) => {
                warn!("Remote backend {} is unreachable: {}", self.backend.name(), e);
                false
            }
        };

        let mut r = self.reachability.write().await;
        r.remote_available = available;
        r.last_probe_at = Some(Utc::now());
        available
    }

    async fn load_snapshots(&self) {
        let records: Vec<ContentRecord> = self.load_snapshot_or_default(CACHE_SNAPSHOT_KEY).await;
        let entries: Vec<SyncQueueEntry> = self.load_snapshot_or_default(QUEUE_SNAPSHOT_KEY).await;

        debug!(
            "Loaded {} cached records and {} queued writes from {} snapshots",
            records.len(),
            entries.len(),
            self.snapshots.backend_name()
        );

        *self.cache.write().await = records
            .into_iter()
            .map(|r| (r.page_id.clone(), r))
            .collect();
        *self.queue.write().await = SyncQueue::from_entries(entries);
    }

    async fn load_snapshot_or_default<T>(&self, key: &str) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        let blob = match self.snapshots.load_snapshot(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Failed to read snapshot {}, starting empty: {}", key, e);
                return T::default();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unparseable snapshot {}: {}", key, e);
                T::default()
            }
        }
    }

    // ── Reads and writes ─────────────────────────────────────────

    /// Stores content for a page.
    ///
    /// The local write is the contract: once it is persisted the call
    /// succeeds whatever the remote does. Remote failures are queued.
    pub async fn put(&self, page_id: &str, draft: ContentDraft) -> StoreResult<ContentRecord> {
        let page_id = PageId::parse(page_id)?;
        let record = ContentRecord::from_draft(page_id, draft, Utc::now())?;

        self.write_local(&record).await?;

        if !self.backend.is_enabled() {
            return Ok(record);
        }

        if self.is_remote_available().await {
            // Only entries already queued now are older than this record.
            let older = self.queue.read().await.ids_for_page(&record.page_id);

            match self
                .remote_write_with_retry(&record, self.config.max_write_attempts)
                .await
            {
                Ok(_) => {
                    let settled = self.queue.write().await.settle(&older, &record);
                    if settled > 0 {
                        debug!("Settled {} queued writes for {}", settled, record.page_id);
                        self.persist_queue().await?;
                    }
                    self.requeue_if_newer(&record).await?;
                    return Ok(record);
                }
                Err(e) => {
                    warn!("Remote write for {} failed, queueing: {}", record.page_id, e);
                }
            }
        } else {
            debug!("Remote unavailable, queueing {}", record.page_id);
        }

        self.enqueue(record.clone()).await?;
        Ok(record)
    }

    /// Reads content for a page.
    ///
    /// When the remote is available its copy wins and refreshes the local
    /// cache; otherwise, or when the remote fails or misses, the local cache
    /// answers.
    pub async fn get(&self, page_id: &str) -> StoreResult<Option<ContentRecord>> {
        let page_id = PageId::parse(page_id)?;

        if self.backend.is_enabled() && self.is_remote_available().await {
            match self.backend.read(&page_id).await {
                Ok(Some(record)) => {
                    let changed = {
                        let mut cache = self.cache.write().await;
                        let changed = cache.get(&page_id) != Some(&record);
                        if changed {
                            cache.insert(page_id.clone(), record.clone());
                        }
                        changed
                    };
                    if changed {
                        if let Err(e) = self.persist_cache().await {
                            warn!("Failed to persist refreshed cache for {}: {}", page_id, e);
                        }
                    }
                    return Ok(Some(record));
                }
                Ok(None) => debug!("Remote has no record for {}", page_id),
                Err(e) => warn!("Remote read for {} failed, using local cache: {}", page_id, e),
            }
        }

        Ok(self.cache.read().await.get(&page_id).cloned())
    }

    /// Page ids held in the local cache, sorted.
    pub async fn pages(&self) -> Vec<PageId> {
        self.cache.read().await.keys().cloned().collect()
    }

    /// Queued writes, oldest first.
    pub async fn pending(&self) -> Vec<SyncQueueEntry> {
        self.queue.read().await.entries()
    }

    // ── Remote sync ──────────────────────────────────────────────

    /// Writes a record remotely, retrying transient failures inline.
    ///
    /// Waits `attempt × base delay` between attempts. A terminal failure
    /// aborts at once.
    pub async fn remote_write_with_retry(
        &self,
        record: &ContentRecord,
        max_attempts: u32,
    ) -> RemoteResult<WriteAck> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.backend.write(record).await {
                Ok(ack) => {
                    debug!("Wrote {} remotely on attempt {}", record.page_id, attempt);
                    return Ok(ack);
                }
                Err(e) if !e.is_retryable() => {
                    warn!("Remote write for {} failed terminally: {}", record.page_id, e);
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    warn!(
                        "Remote write for {} failed after {} attempts: {}",
                        record.page_id, attempt, e
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.config.backoff(attempt);
                    debug!(
                        "Remote write for {} failed (attempt {}/{}), retrying in {:?}: {}",
                        record.page_id, attempt, max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Delivers queued writes, oldest first.
    ///
    /// Returns the number of entries delivered. A drain started while
    /// another is in flight returns 0 without touching the queue.
    pub async fn drain_sync_queue(&self) -> StoreResult<usize> {
        if !self.backend.is_enabled() {
            return Ok(0);
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync queue drain already in flight");
            return Ok(0);
        }
        let _guard = DrainGuard(&self.draining);

        let pending = self.queue.read().await.entries();
        if pending.is_empty() {
            return Ok(0);
        }

        info!("Draining {} queued writes", pending.len());
        let max_attempts = self.config.max_queue_attempts.max(1);
        let mut flushed = 0;

        for entry in pending {
            // Superseded or settled while earlier entries were in flight.
            if !self.queue.read().await.contains(entry.id) {
                continue;
            }

            let outcome = self.backend.write(&entry.record).await;

            let mut queue = self.queue.write().await;
            match outcome {
                Ok(_) => {
                    queue.settle(&[entry.id], &entry.record);
                    drop(queue);
                    flushed += 1;
                    debug!("Delivered queued write for {}", entry.page_id);
                    self.requeue_if_newer(&entry.record).await?;
                }
                Err(e) if !e.is_retryable() => {
                    queue.remove(entry.id);
                    error!(
                        "Dropping queued write for {}: remote refused it: {}",
                        entry.page_id, e
                    );
                }
                Err(e) => match queue.record_failure(entry.id) {
                    Some(attempts) if attempts >= max_attempts => {
                        queue.remove(entry.id);
                        error!(
                            "Dropping queued write for {} after {} failed attempts: {}",
                            entry.page_id, attempts, e
                        );
                    }
                    Some(attempts) => {
                        debug!(
                            "Queued write for {} failed (attempt {}/{}): {}",
                            entry.page_id, attempts, max_attempts, e
                        );
                    }
                    None => {}
                },
            }
        }

        self.persist_queue().await?;
        info!("Sync queue drain delivered {} writes", flushed);
        Ok(flushed)
    }

    /// Makes sure a local record newer than `delivered` is still queued.
    ///
    /// A write that lands after a newer one for the same page leaves the
    /// remote stale; the current local record is queued again so the next
    /// drain restores it.
    async fn requeue_if_newer(&self, delivered: &ContentRecord) -> StoreResult<()> {
        let newer = {
            let cache = self.cache.read().await;
            cache
                .get(&delivered.page_id)
                .filter(|current| {
                    *current != delivered && current.saved_at() >= delivered.saved_at()
                })
                .cloned()
        };
        let Some(current) = newer else {
            return Ok(());
        };

        {
            let mut queue = self.queue.write().await;
            if queue.has_page(&current.page_id) {
                return Ok(());
            }
            warn!(
                "Remote received an older record for {}, queueing the current one",
                current.page_id
            );
            queue.enqueue(current, Utc::now());
        }
        self.persist_queue().await?;
        Ok(())
    }

    // ── Local persistence ────────────────────────────────────────

    async fn write_local(&self, record: &ContentRecord) -> StoreResult<()> {
        let previous = self
            .cache
            .write()
            .await
            .insert(record.page_id.clone(), record.clone());

        if let Err(e) = self.persist_cache().await {
            let mut cache = self.cache.write().await;
            // Only undo our own write; a later put owns the slot otherwise.
            if cache.get(&record.page_id) == Some(record) {
                match previous {
                    Some(prev) => cache.insert(record.page_id.clone(), prev),
                    None => cache.remove(&record.page_id),
                };
            }
            error!("Failed to persist local cache for {}: {}", record.page_id, e);
            return Err(e.into());
        }
        Ok(())
    }

    async fn enqueue(&self, record: ContentRecord) -> StoreResult<()> {
        let page_id = record.page_id.clone();
        let (_, superseded) = self.queue.write().await.enqueue(record, Utc::now());
        if superseded > 0 {
            debug!("Queued write for {} replaced {} older entries", page_id, superseded);
        }
        self.persist_queue().await?;
        Ok(())
    }

    async fn persist_cache(&self) -> StorageResult<()> {
        let _persist = self.cache_persist.lock().await;
        let blob = {
            let cache = self.cache.read().await;
            serde_json::to_string(&cache.values().collect::<Vec<_>>())?
        };
        self.snapshots.save_snapshot(CACHE_SNAPSHOT_KEY, &blob).await
    }

    async fn persist_queue(&self) -> StorageResult<()> {
        let _persist = self.queue_persist.lock().await;
        let blob = serde_json::to_string(&*self.queue.read().await)?;
        self.snapshots.save_snapshot(QUEUE_SNAPSHOT_KEY, &blob).await
    }
}
