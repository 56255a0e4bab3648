//! Page identifiers.
//!
//! A page is addressed by the menu it lives under and its submenu, joined
//! with a single `/` (e.g. `about/welcome`).

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a generated page, always exactly two non-empty segments,
/// neither of them `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId {
    raw: String,
    split: usize,
}

impl PageId {
    /// Parses and validates a page id.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::EmptyPageId);
        }

        let mut segments = s.split('/');
        let (Some(menu), Some(submenu), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(ValidationError::MalformedPageId(s.to_string()));
        };
        // Dot segments would be collapsed by URL normalization on the way out.
        let is_bad = |seg: &str| seg.is_empty() || seg == "." || seg == "..";
        if is_bad(menu) || is_bad(submenu) {
            return Err(ValidationError::MalformedPageId(s.to_string()));
        }

        Ok(Self {
            raw: s.to_string(),
            split: menu.len(),
        })
    }

    /// Builds a page id from its two segments.
    pub fn from_parts(menu: &str, submenu: &str) -> Result<Self, ValidationError> {
        Self::parse(&format!("{menu}/{submenu}"))
    }

    /// The menu segment.
    #[must_use]
    pub fn menu(&self) -> &str {
        &self.raw[..self.split]
    }

    /// The submenu segment.
    #[must_use]
    pub fn submenu(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    /// The full `menu/submenu` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PageId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.raw
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
