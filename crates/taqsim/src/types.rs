//! # Common Types

use serde::{Deserialize, Serialize};

/// Free-form metadata map carried by rules and segments.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A single input page: a numeric identifier plus text content.
///
/// IDs are arbitrary and strictly increasing across an input sequence, but
/// need not be dense; the span of a multi-page segment is measured by ID
/// arithmetic, not index arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// The page identifier.
    pub id: i64,

    /// The page text, typically markdown after upstream HTML conversion.
    pub content: String,
}

impl Page {
    /// Create a new page.
    pub fn new(
        id: i64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}

/// A contiguous slice of source text attributed to a page range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The trimmed segment text.
    pub content: String,

    /// The page the segment starts on.
    pub from: i64,

    /// The page the segment ends on, when it crosses pages.
    ///
    /// When present, `to > from`; absence means single-page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,

    /// Metadata copied from the producing rule, plus any named captures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Segment {
    /// Create a single-page segment.
    pub fn new(
        content: impl Into<String>,
        from: i64,
    ) -> Self {
        Self {
            content: content.into(),
            from,
            to: None,
            meta: None,
        }
    }

    /// The page the segment ends on (`from` for single-page segments).
    pub fn end_id(&self) -> i64 {
        self.to.unwrap_or(self.from)
    }

    /// The page span measured by ID arithmetic; `0` for single-page.
    pub fn span(&self) -> i64 {
        self.end_id() - self.from
    }
}
