//! # Marker Recovery
//!
//! `lineStartsAfter` rules strip their matched marker from the emitted
//! content. This post-pass re-runs the segmenter with every stripping rule
//! converted to its non-stripping `lineStartsWith` variant and grafts the
//! recovered marker text back onto the segments.
//!
//! The pass is idempotent: running it on already-recovered output changes
//! neither content nor counts.

use crate::errors::TqResult;
use crate::rules::{SegmentationOptions, SplitMode};
use crate::segmenter::segment_pages;
use crate::types::{Page, Segment};

/// Restore marker text stripped by `lineStartsAfter` rules.
///
/// When the re-run disagrees with the input segmentation (different
/// counts or mismatched attribution), the input is returned unchanged and
/// the disagreement is logged at `warn`.
pub fn recover_markers(
    pages: &[Page],
    options: &SegmentationOptions,
    segments: &[Segment],
) -> TqResult<Vec<Segment>> {
    if !options
        .rules
        .iter()
        .any(|r| r.line_starts_after.is_some())
    {
        return Ok(segments.to_vec());
    }

    let mut variant = options.clone();
    for rule in &mut variant.rules {
        if let Some(patterns) = rule.line_starts_after.take() {
            rule.line_starts_with = Some(patterns);
            rule.split = Some(SplitMode::At);
        }
    }

    let recovered = segment_pages(pages, &variant)?;
    if recovered.len() != segments.len() {
        log::warn!(
            "marker recovery produced {} segments where input had {}; keeping input",
            recovered.len(),
            segments.len()
        );
        return Ok(segments.to_vec());
    }

    let out = segments
        .iter()
        .zip(recovered)
        .map(|(original, rec)| {
            let matches = rec.from == original.from
                && rec.content.ends_with(original.content.as_str());
            if matches {
                Segment {
                    content: rec.content,
                    ..original.clone()
                }
            } else {
                log::debug!(
                    "marker recovery skipped segment at page {}: attribution mismatch",
                    original.from
                );
                original.clone()
            }
        })
        .collect();

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SplitRule;

    fn pages() -> Vec<Page> {
        vec![Page::new(1, "وروى أحمد حديثا\nوذكر خالد خبرا")]
    }

    fn options() -> SegmentationOptions {
        SegmentationOptions::new()
            .with_rules([
                SplitRule::line_starts_after(["وروى "]),
                SplitRule::line_starts_after(["وذكر "]),
            ])
            .with_max_pages(1)
    }

    #[test]
    fn test_markers_restored() {
        let segments = segment_pages(&pages(), &options()).unwrap();
        assert_eq!(segments[0].content, "أحمد حديثا");

        let recovered = recover_markers(&pages(), &options(), &segments).unwrap();
        assert_eq!(recovered.len(), 2);
        assert_eq!(recovered[0].content, "وروى أحمد حديثا");
        assert_eq!(recovered[1].content, "وذكر خالد خبرا");
        assert_eq!(recovered[0].from, segments[0].from);
    }

    #[test]
    fn test_idempotent() {
        let segments = segment_pages(&pages(), &options()).unwrap();
        let once = recover_markers(&pages(), &options(), &segments).unwrap();
        let twice = recover_markers(&pages(), &options(), &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_noop_without_stripping_rules() {
        let segments = vec![Segment::new("نص", 1)];
        let options = SegmentationOptions::new()
            .with_rules([SplitRule::line_starts_with(["باب"])]);
        let out = recover_markers(&[], &options, &segments).unwrap();
        assert_eq!(out, segments);
    }
}
