//! Remote content backends.
//!
//! The content store mirrors writes through a [`RemoteBackend`]. The HTTP
//! backend talks to a content endpoint; the local-only backend turns
//! mirroring off entirely.

pub mod backend;
pub mod http;
pub mod local;

pub use backend::{RemoteBackend, RemoteError, RemoteResult, WriteAck, RETRYABLE_STATUSES};
pub use http::{HttpBackend, HttpBackendConfig};
pub use local::LocalOnlyBackend;
