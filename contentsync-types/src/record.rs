//! Content records.
//!
//! A [`ContentDraft`] is what a content generator hands over: the structured
//! fields of a page and, optionally, a pre-rendered fragment. The store turns
//! a draft into a [`ContentRecord`] by attaching the page id and stamping the
//! metadata. Records are what gets cached locally, queued and sent to the
//! remote endpoint.

use crate::markup::render_markup;
use crate::{PageId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Version of the record layout written into `metadata.schemaVersion`.
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata key holding the RFC 3339 save timestamp.
pub const META_SAVED_AT: &str = "savedAt";

/// Metadata key holding the schema version.
pub const META_SCHEMA_VERSION: &str = "schemaVersion";

/// A highlighted feature shown below the page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

impl Feature {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Generator output for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDraft {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Pre-rendered fragment. Derived from the fields when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_markup: Option<String>,
    /// Caller-supplied metadata, merged under the store's own keys.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ContentDraft {
    /// Creates a draft with a title and subtitle and no body.
    #[must_use]
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            ..Default::default()
        }
    }

    /// Appends a paragraph.
    #[must_use]
    pub fn with_paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.body.push(paragraph.into());
        self
    }

    /// Appends a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Supplies a pre-rendered fragment.
    #[must_use]
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.rendered_markup = Some(markup.into());
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Checks the fields every stored record must carry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        Ok(())
    }
}

/// The unit of storage, keyed by [`PageId`].
///
/// Writing the same page id again replaces the record wholesale; there is no
/// versioning and no field-level merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub page_id: PageId,
    pub title: String,
    pub subtitle: String,
    pub body: Vec<String>,
    pub features: Vec<Feature>,
    pub rendered_markup: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ContentRecord {
    /// Builds a record from a validated draft, stamping `savedAt` and
    /// `schemaVersion` into the metadata.
    pub fn from_draft(
        page_id: PageId,
        draft: ContentDraft,
        saved_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        draft.validate()?;

        let rendered_markup = match draft.rendered_markup {
            Some(markup) => markup,
            None => render_markup(&draft.title, &draft.subtitle, &draft.body, &draft.features),
        };

        let mut metadata = draft.metadata;
        metadata.insert(META_SAVED_AT.to_string(), Value::String(saved_at.to_rfc3339()));
        metadata.insert(META_SCHEMA_VERSION.to_string(), Value::from(SCHEMA_VERSION));

        Ok(Self {
            page_id,
            title: draft.title,
            subtitle: draft.subtitle,
            body: draft.body,
            features: draft.features,
            rendered_markup,
            metadata,
        })
    }

    /// The save timestamp recorded in the metadata, if present and parseable.
    #[must_use]
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.metadata
            .get(META_SAVED_AT)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The schema version recorded in the metadata.
    #[must_use]
    pub fn schema_version(&self) -> Option<u64> {
        self.metadata.get(META_SCHEMA_VERSION).and_then(Value::as_u64)
    }
}
