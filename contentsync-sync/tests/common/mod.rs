#![allow(dead_code)]

use async_trait::async_trait;
use contentsync_storage::{SnapshotStore, StorageError, StorageResult};
use contentsync_sync::{RemoteBackend, RemoteError, RemoteResult, StoreConfig, WriteAck};
use contentsync_types::{ContentDraft, ContentRecord, Feature, PageId};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted in-process remote.
///
/// Online: writes and reads hit an in-memory map. Offline: every call fails
/// with a transport error. Scripted failures are consumed by writes first.
#[derive(Default)]
pub struct FakeRemote {
    offline: AtomicBool,
    records: Mutex<HashMap<PageId, ContentRecord>>,
    scripted_write_failures: Mutex<VecDeque<RemoteError>>,
    write_calls: AtomicUsize,
    read_calls: AtomicUsize,
    health_calls: AtomicUsize,
    write_delay: Mutex<Duration>,
    planned_writes: Mutex<VecDeque<(Duration, Option<RemoteError>)>>,
    written: Mutex<Vec<PageId>>,
}

impl FakeRemote {
    pub fn online() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        let remote = Self::default();
        remote.set_online(false);
        remote
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    pub fn fail_next_writes(&self, failures: impl IntoIterator<Item = RemoteError>) {
        self.scripted_write_failures.lock().unwrap().extend(failures);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    /// Fixes delay and outcome of upcoming writes, in call order. A planned
    /// write is decided when the call starts, so overlapping calls can be
    /// given different timings.
    pub fn plan_writes(&self, plan: impl IntoIterator<Item = (Duration, Option<RemoteError>)>) {
        self.planned_writes.lock().unwrap().extend(plan);
    }

    pub fn seed(&self, record: ContentRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.page_id.clone(), record);
    }

    pub fn record(&self, page_id: &str) -> Option<ContentRecord> {
        let page_id = PageId::parse(page_id).unwrap();
        self.records.lock().unwrap().get(&page_id).cloned()
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// Page ids of successful writes, in delivery order.
    pub fn written(&self) -> Vec<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteBackend for FakeRemote {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn health_check(&self) -> RemoteResult<()> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline() {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(())
    }

    async fn write(&self, record: &ContentRecord) -> RemoteResult<WriteAck> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        let planned = self.planned_writes.lock().unwrap().pop_front();
        let (delay, planned_failure) = match planned {
            Some((delay, failure)) => (delay, Some(failure)),
            None => (*self.write_delay.lock().unwrap(), None),
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = match planned_failure {
            Some(failure) => failure,
            None => self.scripted_write_failures.lock().unwrap().pop_front(),
        };
        if let Some(err) = failure {
            return Err(err);
        }
        if self.is_offline() {
            return Err(RemoteError::Transport("connection refused".into()));
        }

        self.seed(record.clone());
        self.written.lock().unwrap().push(record.page_id.clone());
        Ok(WriteAck {
            success: true,
            saved_at: Some(serde_json::json!("2026-01-01T00:00:00Z")),
        })
    }

    async fn read(&self, page_id: &PageId) -> RemoteResult<Option<ContentRecord>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline() {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(self.records.lock().unwrap().get(page_id).cloned())
    }
}

/// Snapshot store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakySnapshots {
    inner: contentsync_storage::MemorySnapshotStore,
    fail_writes: AtomicBool,
}

impl FlakySnapshots {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotStore for FlakySnapshots {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn save_snapshot(&self, key: &str, blob: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save_snapshot(key, blob).await
    }

    async fn load_snapshot(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.load_snapshot(key).await
    }
}

/// Routes store logs to the test harness; set RUST_LOG to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// No inline backoff, three queue attempts.
pub fn fast_config() -> StoreConfig {
    StoreConfig {
        max_write_attempts: 3,
        max_queue_attempts: 3,
        retry_base_delay_ms: 0,
    }
}

pub fn draft(title: &str, subtitle: &str, paragraphs: &[&str]) -> ContentDraft {
    paragraphs
        .iter()
        .fold(ContentDraft::new(title, subtitle), |d, p| d.with_paragraph(*p))
}

pub fn feature_draft(title: &str) -> ContentDraft {
    ContentDraft::new(title, "subtitle")
        .with_paragraph("body")
        .with_feature(Feature::new("Speed", "Fast pages"))
}

pub fn record(page_id: &str, title: &str) -> ContentRecord {
    ContentRecord::from_draft(
        PageId::parse(page_id).unwrap(),
        ContentDraft::new(title, "remote"),
        chrono::Utc::now(),
    )
    .unwrap()
}
