//! Core type definitions for contentsync.
//!
//! This crate defines the plain data exchanged between the content store,
//! its local snapshot storage and the remote content endpoint:
//! - Page identifiers (`"<menuId>/<submenuId>"`)
//! - Content drafts as produced by a generator, and the stored records
//! - Markup derivation for records that carry no pre-rendered fragment
//!
//! Nothing here performs I/O.

mod ids;
mod markup;
mod record;

pub use ids::PageId;
pub use markup::{escape_html, render_markup};
pub use record::{
    ContentDraft, ContentRecord, Feature, META_SAVED_AT, META_SCHEMA_VERSION, SCHEMA_VERSION,
};

/// Result type alias using the crate's error type.
pub type TypesResult<T> = std::result::Result<T, ValidationError>;

/// Errors raised when a page id or content payload is malformed.
///
/// Validation failures are raised before any cache or queue is touched and
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("page id must not be empty")]
    EmptyPageId,

    #[error("malformed page id {0:?}: expected \"<menu>/<submenu>\"")]
    MalformedPageId(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
