//! # Segmenter Façade
//!
//! Ties the pipeline together: preprocessing, page map, rule compilation,
//! the first-pass splitter, and the breakpoint processor.

use std::borrow::Cow;

use crate::breakpoints;
use crate::errors::TqResult;
use crate::page_map::PageMap;
use crate::preprocess;
use crate::rules::{SegmentationOptions, compile_breakpoints, compiler::compile_rules};
use crate::splitter;
use crate::text::normalize_line_endings;
use crate::types::{Page, Segment};

/// Segment an ordered sequence of pages under the given options.
///
/// All derived state (page map, compiled regexes, reconstructed
/// boundaries) is allocated, used, and released inside the call; nothing
/// persists across calls. Segments are emitted in monotonic offset order.
///
/// ## Arguments
/// * `pages` - The ordered input pages; ids strictly increase.
/// * `options` - Rules, breakpoints, and limits.
///
/// ## Returns
/// The materialised segments, or an error for invalid patterns, invalid
/// replacement flags, mutually exclusive options, or a stalled breakpoint
/// loop.
pub fn segment_pages(
    pages: &[Page],
    options: &SegmentationOptions,
) -> TqResult<Vec<Segment>> {
    // Compile everything up front so pattern faults fail the call before
    // any content is touched.
    let breakpoints = compile_breakpoints(&options.breakpoints)?;
    let ruleset = compile_rules(&options.rules)?;

    let mut pages = pages.to_vec();
    if !options.replace.is_empty() {
        pages = preprocess::apply_replacements(pages, &options.replace)?;
    }
    if !options.preprocess.is_empty() {
        for page in &mut pages {
            page.content =
                preprocess::apply_preprocess_to_page(&page.content, page.id, &options.preprocess);
        }
    }
    for page in &mut pages {
        if let Cow::Owned(normalized) = normalize_line_endings(&page.content) {
            page.content = normalized;
        }
    }

    let map = PageMap::build(&pages);
    let segments = splitter::first_pass(&map, &ruleset);
    breakpoints::process_segments(segments, &map, options, &breakpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SplitRule;

    #[test]
    fn test_line_endings_normalized_before_matching() {
        let pages = vec![Page::new(1, "مقدمة\r\nباب الصلاة\r\nنصه")];
        let options = SegmentationOptions::new()
            .with_rules([SplitRule::line_starts_with(["{{bab}}"])])
            .with_max_pages(1);

        let segments = segment_pages(&pages, &options).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].content, "مقدمة");
        assert!(segments[1].content.starts_with("باب الصلاة"));
        assert!(!segments[1].content.contains('\r'));
    }

    #[test]
    fn test_replacements_run_before_rules() {
        let pages = vec![Page::new(1, "فصل: الأول\nنصه")];
        let options: SegmentationOptions = serde_json::from_value(serde_json::json!({
            "rules": [{ "lineStartsWith": ["باب"] }],
            "replace": [{ "regex": "^فصل:", "replacement": "باب" }],
            "maxPages": 1,
        }))
        .unwrap();

        let segments = segment_pages(&pages, &options).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].content.starts_with("باب الأول"));
    }

    #[test]
    fn test_invalid_rule_fails_whole_call() {
        let pages = vec![Page::new(1, "نص")];
        let options = SegmentationOptions::new().with_rules([SplitRule::regex("[")]);
        assert!(segment_pages(&pages, &options).is_err());
    }
}
