use contentsync_server::{build_router, ContentDir};
use contentsync_storage::FileSnapshotStore;
use contentsync_sync::{ContentStore, HttpBackend, HttpBackendConfig, StoreConfig};
use contentsync_types::ContentDraft;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

async fn spawn_test_server(data: &TempDir) -> String {
    let app = build_router(Arc::new(ContentDir::new(data.path())));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

/// Base URL of a port nobody listens on.
fn dead_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port())
}

fn fast_config() -> StoreConfig {
    StoreConfig {
        retry_base_delay_ms: 0,
        ..Default::default()
    }
}

fn store_against(base_url: String, cache: &TempDir) -> ContentStore {
    let backend = HttpBackend::new(HttpBackendConfig {
        health_timeout_ms: 500,
        ..HttpBackendConfig::new(base_url)
    })
    .unwrap();
    ContentStore::new(
        fast_config(),
        Arc::new(backend),
        Arc::new(FileSnapshotStore::new(cache.path())),
    )
}

fn welcome() -> ContentDraft {
    ContentDraft::new("T1", "S1").with_paragraph("p1")
}

#[tokio::test]
async fn put_mirrors_to_live_server() {
    let data = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let base = spawn_test_server(&data).await;

    let store = store_against(base, &cache);
    assert!(store.initialize().await.unwrap().remote_available);

    let stored = store.put("about/welcome", welcome()).await.unwrap();
    assert_eq!(store.status().await.sync_queue_size, 0);
    assert!(data.path().join("about").join("welcome.json").exists());

    assert_eq!(store.get("about/welcome").await.unwrap(), Some(stored));
}

#[tokio::test]
async fn get_prefers_server_copy() {
    let data = TempDir::new().unwrap();
    let base = spawn_test_server(&data).await;

    // Another client writes the page first.
    let writer_cache = TempDir::new().unwrap();
    let writer = store_against(base.clone(), &writer_cache);
    writer.initialize().await.unwrap();
    let from_writer = writer
        .put("news/latest", ContentDraft::new("From writer", ""))
        .await
        .unwrap();

    let reader_cache = TempDir::new().unwrap();
    let reader = store_against(base, &reader_cache);
    reader.initialize().await.unwrap();
    assert!(reader.pages().await.is_empty());

    assert_eq!(reader.get("news/latest").await.unwrap(), Some(from_writer));
    assert_eq!(reader.pages().await.len(), 1);
}

#[tokio::test]
async fn outage_then_restart_drains_queue_to_server() {
    let data = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    {
        let offline = store_against(dead_endpoint(), &cache);
        let status = offline.initialize().await.unwrap();
        assert!(!status.remote_available);

        offline.put("about/welcome", welcome()).await.unwrap();
        let got = offline.get("about/welcome").await.unwrap().unwrap();
        assert_eq!(got.title, "T1");
        assert_eq!(offline.status().await.sync_queue_size, 1);
    }

    let base = spawn_test_server(&data).await;
    let online = store_against(base, &cache);
    let status = online.initialize().await.unwrap();

    assert!(status.remote_available);
    assert_eq!(status.sync_queue_size, 0);
    assert_eq!(status.cached_pages, 1);

    let stored = std::fs::read_to_string(data.path().join("about").join("welcome.json")).unwrap();
    assert!(stored.contains("\"title\": \"T1\""));
}
