//! # Segment Validation
//!
//! Re-derives attribution from pages + options + segments and reports
//! discrepancies as structured records, never as panics. Useful for
//! auditing stored segmentation output against its source.

use crate::page_map::PageMap;
use crate::rules::{PageJoiner, SegmentationOptions};
use crate::text::char_len;
use crate::types::{Page, Segment};

/// What kind of discrepancy was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum DiscrepancyKind {
    /// `from` or `to` names a page id not present in the input.
    UnknownPage,

    /// `to` is present but not greater than `from`.
    InvertedRange,

    /// Segments are not in monotonic `from` order.
    NonMonotonic,

    /// The page span exceeds `maxPages`.
    SpanExceeded,

    /// The content exceeds `maxContentLength`.
    LengthExceeded,

    /// The segment content is empty after trimming.
    EmptyContent,

    /// The segment content does not occur in the joined page text.
    MissingContent,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    /// Index of the offending segment.
    pub segment_index: usize,

    /// The discrepancy category.
    pub kind: DiscrepancyKind,

    /// Human-readable detail.
    pub detail: String,
}

/// Probe length, in chars, for the content-presence check.
const CONTENT_PROBE_CHARS: usize = 30;

/// Check the segments against the pages and options they were derived
/// from.
pub fn validate_segments(
    pages: &[Page],
    options: &SegmentationOptions,
    segments: &[Segment],
) -> Vec<Discrepancy> {
    let map = PageMap::build(pages);
    let mut findings = Vec::new();
    let mut prev_from: Option<i64> = None;

    for (i, segment) in segments.iter().enumerate() {
        let mut report = |kind: DiscrepancyKind, detail: String| {
            findings.push(Discrepancy {
                segment_index: i,
                kind,
                detail,
            });
        };

        if map.index_of_id(segment.from).is_none() {
            report(
                DiscrepancyKind::UnknownPage,
                format!("from page {} not in input", segment.from),
            );
        }
        if let Some(to) = segment.to {
            if map.index_of_id(to).is_none() {
                report(
                    DiscrepancyKind::UnknownPage,
                    format!("to page {to} not in input"),
                );
            }
            if to <= segment.from {
                report(
                    DiscrepancyKind::InvertedRange,
                    format!("to {} not greater than from {}", to, segment.from),
                );
            }
        }

        if let Some(prev) = prev_from {
            if segment.from < prev {
                report(
                    DiscrepancyKind::NonMonotonic,
                    format!("from {} after from {prev}", segment.from),
                );
            }
        }
        prev_from = Some(segment.from);

        if segment.span() > i64::from(options.max_pages) {
            report(
                DiscrepancyKind::SpanExceeded,
                format!("span {} exceeds maxPages {}", segment.span(), options.max_pages),
            );
        }
        if let Some(max_len) = options.max_content_length {
            let len = char_len(&segment.content);
            if len > max_len as usize {
                report(
                    DiscrepancyKind::LengthExceeded,
                    format!("length {len} exceeds maxContentLength {max_len}"),
                );
            }
        }

        if segment.content.trim().is_empty() {
            report(DiscrepancyKind::EmptyContent, "empty content".to_string());
        } else if options.page_joiner == PageJoiner::Newline {
            // With the space joiner the emitted content diverges from the
            // joined buffer, so presence cannot be checked byte-for-byte.
            let probe_end = crate::text::char_budget(&segment.content, 0, CONTENT_PROBE_CHARS);
            let probe = &segment.content[..probe_end];
            if !map.buffer().contains(probe) {
                report(
                    DiscrepancyKind::MissingContent,
                    format!("content head {probe:?} not found in pages"),
                );
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SplitRule;
    use crate::segmenter::segment_pages;

    fn pages() -> Vec<Page> {
        vec![
            Page::new(1, "باب الأول\nنص طويل هنا"),
            Page::new(2, "تكملة الكلام"),
            Page::new(3, "باب الثاني\nخاتمة"),
        ]
    }

    #[test]
    fn test_clean_output_validates() {
        let options = SegmentationOptions::new()
            .with_rules([SplitRule::line_starts_with(["{{bab}}"])])
            .with_max_pages(2);
        let segments = segment_pages(&pages(), &options).unwrap();

        assert!(validate_segments(&pages(), &options, &segments).is_empty());
    }

    #[test]
    fn test_detects_violations() {
        let options = SegmentationOptions::new().with_max_pages(1);
        let segments = vec![
            Segment {
                content: "نص غريب تماما".to_string(),
                from: 2,
                to: Some(9),
                meta: None,
            },
            Segment::new("تكملة الكلام", 1),
        ];

        let findings = validate_segments(&pages(), &options, &segments);
        let kinds: Vec<DiscrepancyKind> = findings.iter().map(|f| f.kind).collect();

        assert!(kinds.contains(&DiscrepancyKind::UnknownPage));
        assert!(kinds.contains(&DiscrepancyKind::SpanExceeded));
        assert!(kinds.contains(&DiscrepancyKind::MissingContent));
        assert!(kinds.contains(&DiscrepancyKind::NonMonotonic));
    }
}
