mod common;

use chrono::Utc;
use common::record;
use contentsync_sync::{SyncQueue, SyncQueueEntry};
use contentsync_types::PageId;
use uuid::Uuid;

fn page(s: &str) -> PageId {
    PageId::parse(s).unwrap()
}

// ── Enqueue ──────────────────────────────────────────────────────

#[test]
fn new_queue_is_empty() {
    let queue = SyncQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn enqueue_keeps_fifo_order() {
    let mut queue = SyncQueue::new();
    queue.enqueue(record("a/one", "1"), Utc::now());
    queue.enqueue(record("a/two", "2"), Utc::now());
    queue.enqueue(record("a/three", "3"), Utc::now());

    let order: Vec<_> = queue.iter().map(|e| e.page_id.to_string()).collect();
    assert_eq!(order, vec!["a/one", "a/two", "a/three"]);
}

#[test]
fn new_entries_start_with_zero_attempts() {
    let mut queue = SyncQueue::new();
    let (id, superseded) = queue.enqueue(record("a/one", "1"), Utc::now());
    assert_eq!(superseded, 0);
    assert_eq!(queue.get(id).unwrap().attempt_count, 0);
    assert_eq!(queue.get(id).unwrap().page_id, page("a/one"));
}

#[test]
fn enqueue_supersedes_same_page() {
    let mut queue = SyncQueue::new();
    let (old, _) = queue.enqueue(record("a/one", "old"), Utc::now());
    queue.enqueue(record("a/two", "2"), Utc::now());
    let (new, superseded) = queue.enqueue(record("a/one", "new"), Utc::now());

    assert_eq!(superseded, 1);
    assert!(!queue.contains(old));
    assert!(queue.contains(new));

    // The replacement moves to the back.
    let order: Vec<_> = queue.iter().map(|e| e.record.title.clone()).collect();
    assert_eq!(order, vec!["2", "new"]);
}

// ── Removal ──────────────────────────────────────────────────────

#[test]
fn remove_by_id() {
    let mut queue = SyncQueue::new();
    let (id, _) = queue.enqueue(record("a/one", "1"), Utc::now());
    queue.enqueue(record("a/two", "2"), Utc::now());

    let removed = queue.remove(id).unwrap();
    assert_eq!(removed.page_id, page("a/one"));
    assert_eq!(queue.len(), 1);
    assert!(queue.remove(id).is_none());
}

#[test]
fn remove_unknown_id_is_noop() {
    let mut queue = SyncQueue::new();
    queue.enqueue(record("a/one", "1"), Utc::now());
    assert!(queue.remove(Uuid::now_v7()).is_none());
    assert_eq!(queue.len(), 1);
}

#[test]
fn remove_page_counts_entries() {
    let mut queue = SyncQueue::new();
    queue.enqueue(record("a/one", "1"), Utc::now());
    queue.enqueue(record("a/two", "2"), Utc::now());

    assert_eq!(queue.remove_page(&page("a/one")), 1);
    assert_eq!(queue.remove_page(&page("a/one")), 0);
    assert_eq!(queue.len(), 1);
}

#[test]
fn clear_empties_queue() {
    let mut queue = SyncQueue::new();
    queue.enqueue(record("a/one", "1"), Utc::now());
    queue.clear();
    assert!(queue.is_empty());
}

#[test]
fn ids_for_page_lists_only_that_page() {
    let mut queue = SyncQueue::new();
    let (one, _) = queue.enqueue(record("a/one", "1"), Utc::now());
    queue.enqueue(record("a/two", "2"), Utc::now());

    assert_eq!(queue.ids_for_page(&page("a/one")), vec![one]);
    assert!(queue.has_page(&page("a/two")));
    assert!(!queue.has_page(&page("a/three")));
    assert!(queue.ids_for_page(&page("a/three")).is_empty());
}

#[test]
fn settle_keeps_entries_queued_after_capture() {
    let mut queue = SyncQueue::new();
    let delivered = record("a/one", "delivered");
    let captured = queue.ids_for_page(&delivered.page_id);
    assert!(captured.is_empty());

    // A newer write for the page is queued while `delivered` is in flight.
    let (newer, _) = queue.enqueue(record("a/one", "newer"), Utc::now());

    assert_eq!(queue.settle(&captured, &delivered), 0);
    assert!(queue.contains(newer));
}

#[test]
fn settle_removes_captured_and_identical_entries() {
    let mut queue = SyncQueue::new();
    let (older, _) = queue.enqueue(record("a/one", "older"), Utc::now());
    let captured = queue.ids_for_page(&page("a/one"));
    let delivered = record("a/one", "delivered");
    queue.enqueue(record("a/two", "2"), Utc::now());

    assert_eq!(queue.settle(&captured, &delivered), 1);
    assert!(!queue.contains(older));
    assert_eq!(queue.len(), 1);

    let (same, _) = queue.enqueue(delivered.clone(), Utc::now());
    assert_eq!(queue.settle(&[], &delivered), 1);
    assert!(!queue.contains(same));
}

// ── Attempt tracking ─────────────────────────────────────────────

#[test]
fn record_failure_increments_attempts() {
    let mut queue = SyncQueue::new();
    let (id, _) = queue.enqueue(record("a/one", "1"), Utc::now());

    assert_eq!(queue.record_failure(id), Some(1));
    assert_eq!(queue.record_failure(id), Some(2));
    assert_eq!(queue.get(id).unwrap().attempt_count, 2);
}

#[test]
fn record_failure_on_missing_entry_is_none() {
    let mut queue = SyncQueue::new();
    assert_eq!(queue.record_failure(Uuid::now_v7()), None);
}

// ── Persistence shape ────────────────────────────────────────────

#[test]
fn queue_serializes_as_entry_array() {
    let mut queue = SyncQueue::new();
    let (id, _) = queue.enqueue(record("a/one", "1"), Utc::now());
    queue.record_failure(id);

    let value = serde_json::to_value(&queue).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["pageId"], "a/one");
    assert_eq!(entries[0]["attemptCount"], 1);
    assert!(entries[0].get("enqueuedAt").is_some());

    let restored: SyncQueue = serde_json::from_value(value).unwrap();
    assert_eq!(restored, queue);
}

#[test]
fn from_entries_preserves_order_and_attempts() {
    let mut first = SyncQueueEntry::new(record("a/one", "1"), Utc::now());
    first.attempt_count = 2;
    let second = SyncQueueEntry::new(record("a/two", "2"), Utc::now());

    let queue = SyncQueue::from_entries(vec![first.clone(), second.clone()]);
    assert_eq!(queue.entries(), vec![first, second]);
}
