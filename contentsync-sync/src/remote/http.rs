//! HTTP content endpoint backend.
//!
//! Speaks the small JSON API of a content server:
//! - `GET  /health` -> `{"status":"ok"}`
//! - `POST /content/{menu}/{submenu}` -> `{"success":bool,"savedAt":...}`
//! - `GET  /content/{menu}/{submenu}` -> record, or 404

use super::backend::{RemoteBackend, RemoteError, RemoteResult, WriteAck};
use async_trait::async_trait;
use contentsync_types::{ContentRecord, PageId};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// HTTP backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    /// Base URL of the content endpoint (e.g. `http://localhost:3001`).
    pub base_url: String,
    /// Timeout for the health probe (ms).
    pub health_timeout_ms: u64,
    /// Timeout for record reads (ms).
    pub read_timeout_ms: u64,
    /// Timeout for record writes (ms).
    pub write_timeout_ms: u64,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            health_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
            write_timeout_ms: 30_000,
        }
    }
}

impl HttpBackendConfig {
    /// Default timeouts against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Remote backend over HTTP/JSON.
pub struct HttpBackend {
    config: HttpBackendConfig,
    client: Client,
}

impl HttpBackend {
    /// Creates a new HTTP backend.
    pub fn new(config: HttpBackendConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a backend around an existing client.
    pub fn with_client(config: HttpBackendConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn content_url(&self, page_id: &PageId) -> String {
        format!(
            "{}/content/{}/{}",
            self.base(),
            urlencoding::encode(page_id.menu()),
            urlencoding::encode(page_id.submenu())
        )
    }

    async fn status_error(response: reqwest::Response) -> RemoteError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        RemoteError::Status { status, body }
    }
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn health_check(&self) -> RemoteResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base()))
            .timeout(Duration::from_millis(self.config.health_timeout_ms))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("failed to parse health response: {e}")))?;

        if health.status != "ok" {
            return Err(RemoteError::Unavailable(format!(
                "health status is {:?}",
                health.status
            )));
        }
        Ok(())
    }

    async fn write(&self, record: &ContentRecord) -> RemoteResult<WriteAck> {
        let url = self.content_url(&record.page_id);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_millis(self.config.write_timeout_ms))
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let ack: WriteAck = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("failed to parse write ack: {e}")))?;

        if !ack.success {
            return Err(RemoteError::Rejected(format!(
                "remote reported success=false for {}",
                record.page_id
            )));
        }
        Ok(ack)
    }

    async fn read(&self, page_id: &PageId) -> RemoteResult<Option<ContentRecord>> {
        let url = self.content_url(page_id);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_millis(self.config.read_timeout_ms))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let record: ContentRecord = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("failed to parse content record: {e}")))?;

        if &record.page_id != page_id {
            return Err(RemoteError::Decode(format!(
                "asked for {page_id}, remote returned {}",
                record.page_id
            )));
        }
        Ok(Some(record))
    }
}
