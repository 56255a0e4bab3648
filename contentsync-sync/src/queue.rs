//! Sync queue.
//!
//! Holds remote writes that could not be delivered, oldest first. Entries
//! are addressed by id so the store can settle an entry after an awaited
//! network call even if the queue changed in the meantime.

use chrono::{DateTime, Utc};
use contentsync_types::{ContentRecord, PageId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// A deferred remote write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQueueEntry {
    /// Opaque entry id (UUID v7, so ids sort by creation).
    pub id: Uuid,
    pub page_id: PageId,
    pub record: ContentRecord,
    pub enqueued_at: DateTime<Utc>,
    /// Failed delivery attempts made by queue drains.
    pub attempt_count: u32,
}

impl SyncQueueEntry {
    /// Creates a fresh entry for a record.
    pub fn new(record: ContentRecord, enqueued_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            page_id: record.page_id.clone(),
            record,
            enqueued_at,
            attempt_count: 0,
        }
    }
}

/// FIFO backlog of writes pending delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncQueue {
    entries: VecDeque<SyncQueueEntry>,
}

impl SyncQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a queue from previously persisted entries, keeping their order.
    pub fn from_entries(entries: impl IntoIterator<Item = SyncQueueEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SyncQueueEntry> {
        self.entries.iter()
    }

    /// Clones the current entries, oldest first.
    pub fn entries(&self) -> Vec<SyncQueueEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&SyncQueueEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Appends a write for `record`.
    ///
    /// Pending entries for the same page are superseded: they are removed so
    /// a drain can never deliver an older record after a newer one. Returns
    /// the new entry's id and the number of entries it replaced.
    pub fn enqueue(&mut self, record: ContentRecord, now: DateTime<Utc>) -> (Uuid, usize) {
        let superseded = self.remove_page(&record.page_id);
        let entry = SyncQueueEntry::new(record, now);
        let id = entry.id;
        self.entries.push_back(entry);
        (id, superseded)
    }

    /// Removes an entry by id.
    pub fn remove(&mut self, id: Uuid) -> Option<SyncQueueEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(index)
    }

    /// Removes every entry for a page. Returns how many were removed.
    pub fn remove_page(&mut self, page_id: &PageId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| &e.page_id != page_id);
        before - self.entries.len()
    }

    /// Whether any entry for `page_id` is queued.
    pub fn has_page(&self, page_id: &PageId) -> bool {
        self.entries.iter().any(|e| &e.page_id == page_id)
    }

    /// Ids of the entries currently queued for `page_id`, oldest first.
    pub fn ids_for_page(&self, page_id: &PageId) -> Vec<Uuid> {
        self.entries
            .iter()
            .filter(|e| &e.page_id == page_id)
            .map(|e| e.id)
            .collect()
    }

    /// Settles entries after `delivered` reached the remote.
    ///
    /// Removes the entries named in `ids` (captured before the write went
    /// out) and any entry carrying exactly `delivered`. Entries queued for
    /// the page in the meantime with a different record are kept. Returns
    /// how many were removed.
    pub fn settle(&mut self, ids: &[Uuid], delivered: &ContentRecord) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !ids.contains(&e.id) && e.record != *delivered);
        before - self.entries.len()
    }

    /// Records a failed delivery attempt and returns the new attempt count,
    /// or `None` if the entry is no longer queued.
    pub fn record_failure(&mut self, id: Uuid) -> Option<u32> {
        let entry = self.entries.iter_mut().find(|e| e.id == id)?;
        entry.attempt_count = entry.attempt_count.saturating_add(1);
        Some(entry.attempt_count)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
