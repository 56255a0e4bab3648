//! Remote backend abstraction trait.
//!
//! Defines the request/response surface the content store needs from a
//! remote content endpoint, and the failure classification that decides
//! whether a write is worth retrying.

use async_trait::async_trait;
use contentsync_types::{ContentRecord, PageId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP statuses treated as transient.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of a single remote call.
///
/// Only used between the store and its backend; callers of the store never
/// see these.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The call exceeded its timeout.
    #[error("remote call timed out")]
    Timeout,

    /// Connection-level failure (refused, reset, DNS, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The remote answered but refused the write.
    #[error("remote rejected write: {0}")]
    Rejected(String),

    /// The response could not be decoded.
    #[error("invalid remote response: {0}")]
    Decode(String),

    /// The remote is not reachable or not serving.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Returns true if the failure is transient and the call may be retried.
    ///
    /// Rejections, client errors and undecodable responses are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Timeout | RemoteError::Transport(_) | RemoteError::Unavailable(_) => true,
            RemoteError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            RemoteError::Rejected(_) | RemoteError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

/// Acknowledgement returned by a successful remote write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    pub success: bool,
    /// Server-side save time, in whatever form the remote reports it.
    #[serde(default)]
    pub saved_at: Option<serde_json::Value>,
}

/// Abstract remote content endpoint.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &'static str;

    /// Whether the backend mirrors anything at all. A disabled backend is
    /// never probed and writes against it are never queued.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Lightweight reachability probe.
    async fn health_check(&self) -> RemoteResult<()>;

    /// Stores a record remotely, replacing any previous one for its page.
    async fn write(&self, record: &ContentRecord) -> RemoteResult<WriteAck>;

    /// Reads a record; `Ok(None)` when the remote does not hold the page.
    async fn read(&self, page_id: &PageId) -> RemoteResult<Option<ContentRecord>>;
}
