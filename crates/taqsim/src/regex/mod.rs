//! # Regex Plumbing
//!
//! Mechanisms to mix `regex` and `fancy_regex` engines behind one interface.
//!
//! The combined rule alternation is always a `regex` (Basic) pattern for a
//! single fast pass over the joined buffer; standalone rules, guards, and
//! `skipWhen` patterns compile adaptively, falling back to `fancy_regex`
//! when the pattern needs backreferences or lookaround.

mod regex_wrapper;
mod union;

pub use regex_wrapper::{
    CaptureMatchesWrapper, CapturesWrapper, ErrorWrapper, MatchSpan, MatchesWrapper, RegexWrapper,
    RegexWrapperPattern,
};
pub use union::{exact_match_union_pattern, word_union_pattern};
