//! Structural invariant proptests over randomised Arabic-ish page text.

use proptest::prelude::*;
use taqsim::{Page, SegmentationOptions, SplitRule, segment_pages};

/// Drop all whitespace, leaving the comparable character stream.
fn strip_ws(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Assert ordering, range, and span invariants on a segment run.
fn assert_structural_invariants(
    segments: &[taqsim::Segment],
    max_pages: u32,
) -> Result<(), TestCaseError> {
    let mut prev_from = i64::MIN;
    for (i, s) in segments.iter().enumerate() {
        prop_assert!(
            s.from >= prev_from,
            "segment {i} from {} after from {prev_from}",
            s.from
        );
        prev_from = s.from;

        if let Some(to) = s.to {
            prop_assert!(to > s.from, "segment {i} inverted range {}..{to}", s.from);
        }
        prop_assert!(
            s.span() <= i64::from(max_pages),
            "segment {i} span {} exceeds {max_pages}",
            s.span()
        );
        prop_assert!(!s.content.trim().is_empty(), "segment {i} empty");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Non-stripping rules lose no content: the concatenated segments
    /// equal the concatenated pages modulo whitespace.
    #[test]
    fn coverage_and_monotonicity(
        texts in proptest::collection::vec("[ابجدهوزحطيقلمنس \\n۔]{0,80}", 1..6),
        max_pages in 0u32..4,
    ) {
        let pages: Vec<Page> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Page::new(i as i64, t.clone()))
            .collect();
        let options = SegmentationOptions::new()
            .with_rules([SplitRule::line_starts_with(["قال"])])
            .with_breakpoints([""])
            .with_max_pages(max_pages);

        let segments = segment_pages(&pages, &options).unwrap();

        let expected: String = pages.iter().map(|p| strip_ws(&p.content)).collect();
        let actual: String = segments.iter().map(|s| strip_ws(&s.content)).collect();
        prop_assert_eq!(actual, expected);

        assert_structural_invariants(&segments, max_pages)?;
    }

    /// `maxContentLength` is a hard cap on every emitted segment.
    #[test]
    fn length_bound(
        texts in proptest::collection::vec("[ابجدهوزحطيقلمنس \\n۔]{0,120}", 1..4),
        max_pages in 0u32..3,
        max_len in 8u32..60,
    ) {
        let pages: Vec<Page> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Page::new(i as i64 * 2, t.clone()))
            .collect();
        let options = SegmentationOptions::new()
            .with_breakpoints(["۔", ""])
            .with_max_pages(max_pages)
            .with_max_content_length(max_len);

        let segments = segment_pages(&pages, &options).unwrap();

        for s in &segments {
            prop_assert!(
                s.content.chars().count() <= max_len as usize,
                "segment of {} chars exceeds {max_len}: {:?}",
                s.content.chars().count(),
                s.content
            );
        }
        assert_structural_invariants(&segments, max_pages)?;

        let expected: String = pages.iter().map(|p| strip_ws(&p.content)).collect();
        let actual: String = segments.iter().map(|s| strip_ws(&s.content)).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Diacritic insensitivity: a fuzzy rule matches a phrase with
    /// arbitrary harakat inserted exactly as it matches the bare phrase.
    #[test]
    fn fuzzy_harakat_insensitive(
        harakat in proptest::collection::vec(0x064Bu32..0x0653, 0..8),
    ) {
        let bare = "حدثنا";
        let mut vocalised = String::new();
        let mut marks = harakat.iter().map(|c| char::from_u32(*c).unwrap());
        for c in bare.chars() {
            vocalised.push(c);
            if let Some(mark) = marks.next() {
                vocalised.push(mark);
            }
        }

        let options = SegmentationOptions::new()
            .with_rules([SplitRule::line_starts_with([bare]).with_fuzzy(true)])
            .with_max_pages(1);

        let pages = vec![Page::new(1, format!("تمهيد\n{vocalised} سفيان"))];
        let segments = segment_pages(&pages, &options).unwrap();
        prop_assert_eq!(segments.len(), 2, "vocalised {:?} did not split", vocalised);
    }
}
