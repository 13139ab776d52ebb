//! # Segmentation Options

use serde::{Deserialize, Serialize};

use crate::preprocess::{PreprocessStep, ReplaceRule};
use crate::rules::breakpoint::Breakpoint;
use crate::rules::split_rule::SplitRule;

/// Which pattern match a breakpoint prefers within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Prefer {
    /// Return the last valid match (longest piece).
    Longer,

    /// Return the first valid match (streaming early-exit).
    #[default]
    Shorter,
}

/// How page-boundary newlines appear in emitted spanning content.
///
/// Matching internally always uses `'\n'`; this only affects the final
/// `content` of segments that span pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PageJoiner {
    /// Emit the page-boundary newline as a single space.
    Space,

    /// Keep the newline.
    #[default]
    Newline,
}

/// The full declarative input to [`segment_pages`](crate::segment_pages).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentationOptions {
    /// Structural split rules, in priority order (earlier wins).
    pub rules: Vec<SplitRule>,

    /// Breakpoints applied to oversized segments, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakpoints: Vec<Breakpoint>,

    /// Maximum page span `to - from` of a segment. `0` means one segment
    /// per page.
    pub max_pages: u32,

    /// Hard character cap on segment content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_content_length: Option<u32>,

    /// Breakpoint match preference within a window.
    pub prefer: Prefer,

    /// Page-boundary rendering in emitted spanning content.
    pub page_joiner: PageJoiner,

    /// Regex replacements applied to page content before segmentation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<ReplaceRule>,

    /// Named per-page transforms applied before segmentation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preprocess: Vec<PreprocessStep>,
}

impl SegmentationOptions {
    /// Empty options: no rules, no breakpoints, one segment per page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the split rules.
    pub fn with_rules<I>(
        mut self,
        rules: I,
    ) -> Self
    where
        I: IntoIterator<Item = SplitRule>,
    {
        self.rules = rules.into_iter().collect();
        self
    }

    /// Replace the breakpoints.
    pub fn with_breakpoints<I, B>(
        mut self,
        breakpoints: I,
    ) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Breakpoint>,
    {
        self.breakpoints = breakpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum page span.
    pub fn with_max_pages(
        mut self,
        max_pages: u32,
    ) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the hard character cap.
    pub fn with_max_content_length(
        mut self,
        max_content_length: u32,
    ) -> Self {
        self.max_content_length = Some(max_content_length);
        self
    }

    /// Set the breakpoint match preference.
    pub fn with_prefer(
        mut self,
        prefer: Prefer,
    ) -> Self {
        self.prefer = prefer;
        self
    }

    /// Set the page-joiner rendering.
    pub fn with_page_joiner(
        mut self,
        page_joiner: PageJoiner,
    ) -> Self {
        self.page_joiner = page_joiner;
        self
    }

    /// Replace the pre-segmentation regex replacements.
    pub fn with_replace<I>(
        mut self,
        replace: I,
    ) -> Self
    where
        I: IntoIterator<Item = ReplaceRule>,
    {
        self.replace = replace.into_iter().collect();
        self
    }

    /// Replace the pre-segmentation named transforms.
    pub fn with_preprocess<I>(
        mut self,
        preprocess: I,
    ) -> Self
    where
        I: IntoIterator<Item = PreprocessStep>,
    {
        self.preprocess = preprocess.into_iter().collect();
        self
    }
}
