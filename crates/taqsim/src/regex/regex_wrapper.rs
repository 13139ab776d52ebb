//! # Regex Wrapper
//! This module provides mechanisms to mix `regex` and `fancy_regex` types.

use core::ops::Range;

/// Error wrapper for regex patterns.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum ErrorWrapper {
    /// Error from `regex`.
    Basic(Box<regex::Error>),

    /// Error from `fancy_regex`.
    Fancy(Box<fancy_regex::Error>),
}

impl From<regex::Error> for ErrorWrapper {
    fn from(err: regex::Error) -> Self {
        Self::Basic(err.into())
    }
}

impl From<fancy_regex::Error> for ErrorWrapper {
    fn from(err: fancy_regex::Error) -> Self {
        Self::Fancy(err.into())
    }
}

impl core::fmt::Display for ErrorWrapper {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Basic(err) => core::fmt::Display::fmt(err, f),
            Self::Fancy(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ErrorWrapper {}

/// A matched byte range in a haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan {
    /// Byte offset of the match start.
    pub start: usize,

    /// Byte offset one past the match end.
    pub end: usize,
}

impl MatchSpan {
    /// The matched range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The matched length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Is this a zero-length match?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<regex::Match<'_>> for MatchSpan {
    fn from(m: regex::Match<'_>) -> Self {
        Self {
            start: m.start(),
            end: m.end(),
        }
    }
}

impl From<fancy_regex::Match<'_>> for MatchSpan {
    fn from(m: fancy_regex::Match<'_>) -> Self {
        Self {
            start: m.start(),
            end: m.end(),
        }
    }
}

/// Label for regex patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RegexWrapperPattern {
    /// This is a pattern for the `regex` crate.
    Basic(String),

    /// This is a pattern for the `fancy_regex` crate.
    Fancy(String),

    /// This pattern will try the `regex` crate first,
    /// and fallback to `fancy_regex` if it fails.
    Adaptive(String),
}

impl From<&str> for RegexWrapperPattern {
    fn from(pattern: &str) -> Self {
        Self::Adaptive(pattern.to_string())
    }
}

impl From<String> for RegexWrapperPattern {
    fn from(pattern: String) -> Self {
        Self::Adaptive(pattern)
    }
}

impl RegexWrapperPattern {
    /// Get the underlying regex pattern.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) => pattern,
            Self::Fancy(pattern) => pattern,
            Self::Adaptive(pattern) => pattern,
        }
    }

    /// Compile the regex pattern into a `RegexWrapper`.
    ///
    /// ## Returns
    /// A `Result` containing the compiled `RegexWrapper` or an `ErrorWrapper`.
    pub fn compile(&self) -> Result<RegexWrapper, ErrorWrapper> {
        match self {
            Self::Basic(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .map_err(ErrorWrapper::from),
            Self::Fancy(pattern) => fancy_regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .map_err(ErrorWrapper::from),
            Self::Adaptive(pattern) => regex::Regex::new(pattern)
                .map(RegexWrapper::from)
                .or_else(|_| {
                    fancy_regex::Regex::new(pattern)
                        .map(RegexWrapper::from)
                        .map_err(ErrorWrapper::from)
                }),
        }
    }
}

/// Wrapper for compiled regex patterns.
#[derive(Debug, Clone)]
pub enum RegexWrapper {
    /// Wrapper for `regex::Regex`.
    Basic(regex::Regex),

    /// Wrapper for `fancy_regex::Regex`.
    Fancy(fancy_regex::Regex),
}

impl PartialEq for RegexWrapper {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Self::Basic(a), Self::Basic(b)) => a.as_str() == b.as_str(),
            (Self::Fancy(a), Self::Fancy(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<regex::Regex> for RegexWrapper {
    fn from(regex: regex::Regex) -> Self {
        Self::Basic(regex)
    }
}

impl From<fancy_regex::Regex> for RegexWrapper {
    fn from(regex: fancy_regex::Regex) -> Self {
        Self::Fancy(regex)
    }
}

impl RegexWrapper {
    /// Is this `Basic`?
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    /// Is this `Fancy`?
    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    /// Get the underlying regex pattern.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(regex) => regex.as_str(),
            Self::Fancy(regex) => regex.as_str(),
        }
    }

    /// Does the pattern match anywhere in the haystack?
    ///
    /// A `fancy_regex` runtime failure (backtrack limit) is logged at `warn`
    /// and reported as a non-match.
    pub fn is_match(
        &self,
        haystack: &str,
    ) -> bool {
        match self {
            Self::Basic(regex) => regex.is_match(haystack),
            Self::Fancy(regex) => regex.is_match(haystack).unwrap_or_else(|err| {
                log::warn!("fancy_regex runtime failure for {:?}: {err}", self.as_str());
                false
            }),
        }
    }

    /// Find the first match in the haystack.
    pub fn find(
        &self,
        haystack: &str,
    ) -> Option<MatchSpan> {
        match self {
            Self::Basic(regex) => regex.find(haystack).map(MatchSpan::from),
            Self::Fancy(regex) => match regex.find(haystack) {
                Ok(m) => m.map(MatchSpan::from),
                Err(err) => {
                    log::warn!("fancy_regex runtime failure for {:?}: {err}", self.as_str());
                    None
                }
            },
        }
    }

    /// Wrapper for `find_iter`.
    pub fn find_iter<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> MatchesWrapper<'r, 'h> {
        match self {
            Self::Basic(regex) => MatchesWrapper::Basic(regex.find_iter(haystack)),
            Self::Fancy(regex) => MatchesWrapper::Fancy(regex.find_iter(haystack)),
        }
    }

    /// Wrapper for `captures_iter`.
    pub fn captures_iter<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> CaptureMatchesWrapper<'r, 'h> {
        match self {
            Self::Basic(regex) => CaptureMatchesWrapper::Basic(regex.captures_iter(haystack)),
            Self::Fancy(regex) => CaptureMatchesWrapper::Fancy(regex.captures_iter(haystack)),
        }
    }

    /// The capture group names, indexed by group number.
    ///
    /// Group 0 (the whole match) is unnamed and reported as `None`.
    pub fn capture_names(&self) -> Vec<Option<String>> {
        match self {
            Self::Basic(regex) => regex
                .capture_names()
                .map(|n| n.map(str::to_string))
                .collect(),
            Self::Fancy(regex) => regex
                .capture_names()
                .map(|n| n.map(str::to_string))
                .collect(),
        }
    }

    /// Replace every match with the replacement text.
    ///
    /// Group references (`$name`, `$1`) follow the underlying engine's
    /// replacement syntax, which is shared between the two.
    pub fn replace_all(
        &self,
        haystack: &str,
        replacement: &str,
    ) -> String {
        match self {
            Self::Basic(regex) => regex.replace_all(haystack, replacement).into_owned(),
            Self::Fancy(regex) => regex.replace_all(haystack, replacement).into_owned(),
        }
    }

    /// The total number of capture groups, including group 0.
    pub fn captures_len(&self) -> usize {
        match self {
            Self::Basic(regex) => regex.captures_len(),
            Self::Fancy(regex) => regex.capture_names().count(),
        }
    }
}

/// Wrapper for regex match iterators.
pub enum MatchesWrapper<'r, 'h> {
    /// Wrapper for `regex::Matches`.
    Basic(regex::Matches<'r, 'h>),

    /// Wrapper for `fancy_regex::Matches`.
    Fancy(fancy_regex::Matches<'r, 'h>),
}

impl Iterator for MatchesWrapper<'_, '_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Basic(matches) => matches.next().map(MatchSpan::from),
            Self::Fancy(matches) => match matches.next()? {
                Ok(m) => Some(MatchSpan::from(m)),
                Err(err) => {
                    log::warn!("fancy_regex runtime failure during iteration: {err}");
                    None
                }
            },
        }
    }
}

/// Wrapper for captured match groups.
pub enum CapturesWrapper<'h> {
    /// Wrapper for `regex::Captures`.
    Basic(regex::Captures<'h>),

    /// Wrapper for `fancy_regex::Captures`.
    Fancy(fancy_regex::Captures<'h>),
}

impl CapturesWrapper<'_> {
    /// The span of the numbered group, if it participated in the match.
    pub fn get(
        &self,
        index: usize,
    ) -> Option<MatchSpan> {
        match self {
            Self::Basic(caps) => caps.get(index).map(MatchSpan::from),
            Self::Fancy(caps) => caps.get(index).map(MatchSpan::from),
        }
    }

    /// The span of the named group, if it participated in the match.
    pub fn name(
        &self,
        name: &str,
    ) -> Option<MatchSpan> {
        match self {
            Self::Basic(caps) => caps.name(name).map(MatchSpan::from),
            Self::Fancy(caps) => caps.name(name).map(MatchSpan::from),
        }
    }

    /// The span of the whole match (group 0).
    pub fn entire(&self) -> MatchSpan {
        self.get(0).unwrap()
    }
}

/// Wrapper for capture match iterators.
pub enum CaptureMatchesWrapper<'r, 'h> {
    /// Wrapper for `regex::CaptureMatches`.
    Basic(regex::CaptureMatches<'r, 'h>),

    /// Wrapper for `fancy_regex::CaptureMatches`.
    Fancy(fancy_regex::CaptureMatches<'r, 'h>),
}

impl<'h> Iterator for CaptureMatchesWrapper<'_, 'h> {
    type Item = CapturesWrapper<'h>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Basic(caps) => caps.next().map(CapturesWrapper::Basic),
            Self::Fancy(caps) => match caps.next()? {
                Ok(c) => Some(CapturesWrapper::Fancy(c)),
                Err(err) => {
                    log::warn!("fancy_regex runtime failure during iteration: {err}");
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_eq() {
        let b0 = RegexWrapperPattern::Basic("hello world".to_string())
            .compile()
            .unwrap();
        let b1 = RegexWrapperPattern::Basic("world".to_string())
            .compile()
            .unwrap();
        let f0 = RegexWrapperPattern::Fancy("hello world".to_string())
            .compile()
            .unwrap();

        assert_eq!(&b0, &b0);
        assert_ne!(&b0, &b1);
        assert_ne!(&b0, &f0);
        assert_ne!(&f0, &b0);
    }

    #[test]
    fn test_adaptive_falls_back_on_backreference() {
        let pattern: RegexWrapperPattern = r"(\w+) \1".into();
        let re = pattern.compile().unwrap();
        assert!(re.is_fancy());
        assert!(re.is_match("قال قال"));
        assert!(!re.is_match("قال روى"));
    }

    #[test]
    fn test_adaptive_prefers_basic() {
        let re = RegexWrapperPattern::from(r"\w+").compile().unwrap();
        assert!(re.is_basic());
    }

    #[test]
    fn test_invalid_pattern_errors() {
        let err = RegexWrapperPattern::Basic(r"[".to_string())
            .compile()
            .unwrap_err();
        assert!(matches!(err, ErrorWrapper::Basic(_)));

        let err = RegexWrapperPattern::Fancy(r"[".to_string())
            .compile()
            .unwrap_err();
        assert!(matches!(err, ErrorWrapper::Fancy(_)));
    }

    #[test]
    fn test_named_captures_both_engines() {
        for pattern in [
            RegexWrapperPattern::Basic(r"(?P<num>[0-9]+)".to_string()),
            RegexWrapperPattern::Fancy(r"(?P<num>[0-9]+)".to_string()),
        ] {
            let re = pattern.compile().unwrap();
            let caps = re.captures_iter("abc 42 def").next().unwrap();
            let span = caps.name("num").unwrap();
            assert_eq!(span.range(), 4..6);
            assert_eq!(re.capture_names(), vec![None, Some("num".to_string())]);
        }
    }

    #[test]
    fn test_find_iter_spans() {
        let re = RegexWrapperPattern::from(r"[0-9]+").compile().unwrap();
        let spans: Vec<_> = re.find_iter("a1b22c333").map(|m| m.range()).collect();
        assert_eq!(spans, vec![1..2, 3..5, 6..9]);
    }
}
