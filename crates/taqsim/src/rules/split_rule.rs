//! # Split Rules

use serde::{Deserialize, Serialize};

use crate::errors::{TaqsimError, TqResult};
use crate::rules::constraints::RuleConstraints;
use crate::types::Meta;

/// Where a split lands relative to its match.
///
/// `At` splits **before** the match (the match belongs to the next
/// segment); `After` splits **after** it (the match belongs to the
/// previous segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SplitMode {
    /// Split before the match.
    #[default]
    At,

    /// Split after the match.
    After,
}

/// Which of a rule's matches become split points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Occurrence {
    /// The first match in each sliding window.
    First,

    /// The last match in each sliding window.
    Last,

    /// Every match.
    #[default]
    All,
}

impl Occurrence {
    /// Is this the pass-through default?
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// A declarative structural boundary.
///
/// Exactly one of `line_starts_with`, `line_starts_after`, or `regex` must
/// be set; [`SplitRule::kind`] enforces this. `lineStartsAfter` is the
/// data-stripping variant: it always splits at the match and removes the
/// matched marker from the emitted content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SplitRule {
    /// Match where a line begins with any of these pattern templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_starts_with: Option<Vec<String>>,

    /// Like `lineStartsWith`, but the matched marker is stripped from the
    /// emitted content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_starts_after: Option<Vec<String>>,

    /// A raw regex; bracket auto-escaping is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// Pass literal pattern text through the fuzzy transformer.
    #[serde(skip_serializing_if = "is_false")]
    pub fuzzy: bool,

    /// Where the split lands; defaults to `at`. Ignored by
    /// `lineStartsAfter`, which always splits at the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitMode>,

    /// Metadata copied onto segments this rule produces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    /// Which matches become split points.
    #[serde(skip_serializing_if = "Occurrence::is_all")]
    pub occurrence: Occurrence,

    /// Sliding-window size (in page ids) for `first`/`last` occurrence
    /// selection over consecutive pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_span: Option<u32>,

    /// Conditions a page-start match on the previous page's last
    /// non-whitespace character matching this pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start_guard: Option<String>,

    /// Page-id constraints.
    #[serde(flatten)]
    pub constraints: RuleConstraints,
}

/// A borrowed view of the rule variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleKind<'a> {
    /// Match at a line start; the marker stays in the content.
    LineStartsWith(&'a [String]),

    /// Match at a line start; the marker is stripped.
    LineStartsAfter(&'a [String]),

    /// A raw regex pattern.
    Regex(&'a str),
}

impl SplitRule {
    /// A rule matching where a line begins with any of the patterns.
    pub fn line_starts_with<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line_starts_with: Some(patterns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// A marker-stripping rule matching where a line begins with any of
    /// the patterns.
    pub fn line_starts_after<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            line_starts_after: Some(patterns.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// A raw-regex rule.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Enable the fuzzy transformer for literal pattern text.
    pub fn with_fuzzy(
        mut self,
        fuzzy: bool,
    ) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Set the split mode.
    pub fn with_split(
        mut self,
        split: SplitMode,
    ) -> Self {
        self.split = Some(split);
        self
    }

    /// Attach metadata copied onto produced segments.
    pub fn with_meta(
        mut self,
        meta: Meta,
    ) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Set occurrence selection.
    pub fn with_occurrence(
        mut self,
        occurrence: Occurrence,
    ) -> Self {
        self.occurrence = occurrence;
        self
    }

    /// Set the occurrence sliding-window size.
    pub fn with_max_span(
        mut self,
        max_span: u32,
    ) -> Self {
        self.max_span = Some(max_span);
        self
    }

    /// Set the page-start guard pattern.
    pub fn with_page_start_guard(
        mut self,
        guard: impl Into<String>,
    ) -> Self {
        self.page_start_guard = Some(guard.into());
        self
    }

    /// Replace the page-id constraints.
    pub fn with_constraints(
        mut self,
        constraints: RuleConstraints,
    ) -> Self {
        self.constraints = constraints;
        self
    }

    /// The rule variant, enforcing that exactly one source field is set.
    pub fn kind(&self) -> TqResult<RuleKind<'_>> {
        match (&self.line_starts_with, &self.line_starts_after, &self.regex) {
            (Some(p), None, None) => Ok(RuleKind::LineStartsWith(p)),
            (None, Some(p), None) => Ok(RuleKind::LineStartsAfter(p)),
            (None, None, Some(r)) => Ok(RuleKind::Regex(r)),
            _ => Err(TaqsimError::MutuallyExclusiveOptions(
                "a split rule takes exactly one of lineStartsWith, lineStartsAfter, or regex"
                    .to_string(),
            )),
        }
    }

    /// The effective split mode: `lineStartsAfter` always splits at the
    /// match; otherwise the declared mode, defaulting to `at`.
    pub fn effective_split(&self) -> SplitMode {
        if self.line_starts_after.is_some() {
            SplitMode::At
        } else {
            self.split.unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_enforces_exclusivity() {
        let rule = SplitRule {
            line_starts_with: Some(vec!["{{bab}}".to_string()]),
            regex: Some("x".to_string()),
            ..SplitRule::default()
        };
        assert!(matches!(
            rule.kind(),
            Err(TaqsimError::MutuallyExclusiveOptions(_))
        ));

        assert!(SplitRule::default().kind().is_err());
        assert!(matches!(
            SplitRule::regex("x").kind(),
            Ok(RuleKind::Regex("x"))
        ));
    }

    #[test]
    fn test_line_starts_after_forces_at() {
        let rule = SplitRule::line_starts_after(["وروى "]).with_split(SplitMode::After);
        assert_eq!(rule.effective_split(), SplitMode::At);

        let rule = SplitRule::line_starts_with(["{{bab}}"]).with_split(SplitMode::After);
        assert_eq!(rule.effective_split(), SplitMode::After);
    }

    #[test]
    fn test_serde_camel_case() {
        let rule: SplitRule = serde_json::from_value(serde_json::json!({
            "lineStartsAfter": ["## {{raqms:num}}"],
            "fuzzy": true,
            "maxSpan": 2,
            "min": 5,
            "exclude": [7],
        }))
        .unwrap();

        assert!(rule.fuzzy);
        assert_eq!(rule.max_span, Some(2));
        assert_eq!(rule.constraints.min, Some(5));
        assert!(rule.constraints.excludes(7));
        assert!(matches!(rule.kind(), Ok(RuleKind::LineStartsAfter(_))));
    }
}
