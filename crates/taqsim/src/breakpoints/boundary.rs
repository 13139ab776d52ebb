//! # Boundary Reconstruction
//!
//! Structural rules may have stripped marker text, so raw cumulative
//! offsets drift against a segment's actual content. For segments spanning
//! fewer than [`BOUNDARY_SEARCH_MAX_PAGES`] pages, each page's start is
//! found by searching for its prefix (progressively shorter needles)
//! within a bounded region around the expected offset, preferring
//! newline-preceded candidates; larger segments use cumulative offsets
//! directly.

use crate::page_map::PageMap;
use crate::text::char_budget;

/// Segments spanning at least this many pages skip prefix search and use
/// cumulative offsets only.
pub const BOUNDARY_SEARCH_MAX_PAGES: usize = 50;

/// Prefix needle lengths, in chars, tried longest first.
const NEEDLE_CHAR_LENGTHS: [usize; 5] = [80, 40, 20, 10, 6];

/// Maximum distance (bytes) between a candidate and its expected offset.
const SEARCH_TOLERANCE: usize = 2000;

/// Candidates examined per needle before giving up on better ones.
const MAX_CANDIDATES: usize = 32;

/// Reconstructed page-start offsets within one segment's content.
///
/// `offsets[k]` is the content byte offset where the segment's `k`-th page
/// begins (`offsets[0] == 0`); a sentinel equal to the content length is
/// always appended. Offsets strictly increase except possibly at the
/// degenerate tail, where they are capped at the content length.
#[derive(Debug, Clone)]
pub struct SegmentPageOffsets {
    /// The page-map index of the segment's first page.
    pub from_index: usize,

    offsets: Vec<usize>,
}

impl SegmentPageOffsets {
    /// The number of pages covered (sentinel excluded).
    pub fn page_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// The content offset where local page `k` starts; `k == page_count()`
    /// yields the sentinel.
    pub fn start_of(
        &self,
        k: usize,
    ) -> usize {
        self.offsets[k]
    }

    /// The local page index holding a content position.
    pub fn local_index_for_position(
        &self,
        pos: usize,
    ) -> usize {
        let starts = &self.offsets[..self.page_count()];
        starts.partition_point(|&o| o <= pos).saturating_sub(1)
    }
}

/// Reconstruct per-page start offsets for a segment covering page-map
/// indices `from_index..=to_index`.
pub fn reconstruct(
    content: &str,
    map: &PageMap,
    from_index: usize,
    to_index: usize,
) -> SegmentPageOffsets {
    let page_count = to_index - from_index + 1;
    let len = content.len();
    let accurate = page_count < BOUNDARY_SEARCH_MAX_PAGES;

    let mut offsets = Vec::with_capacity(page_count + 1);
    offsets.push(0usize);

    let mut expected = 0usize;
    let mut prev = 0usize;

    for k in 1..page_count {
        let prev_b = map.boundaries()[from_index + k - 1];
        expected += (prev_b.end - prev_b.start) + 1;

        let found = if accurate {
            let b = map.boundaries()[from_index + k];
            let page = &map.buffer()[b.start..b.end];
            let hit = search_page_prefix(content, page, expected, prev);
            if hit.is_none() {
                log::warn!(
                    "page {} prefix not found near offset {expected}; using cumulative offset",
                    b.id
                );
            }
            hit
        } else {
            None
        };

        let mut off = found.unwrap_or_else(|| expected.min(len));
        off = off.max(prev + 1).min(len);
        while off < len && !content.is_char_boundary(off) {
            off += 1;
        }

        offsets.push(off);
        prev = off;
    }

    offsets.push(len);
    SegmentPageOffsets { from_index, offsets }
}

/// Find the page's start in `content` by prefix search around `expected`.
fn search_page_prefix(
    content: &str,
    page: &str,
    expected: usize,
    prev: usize,
) -> Option<usize> {
    let page = page.trim_start();
    if page.is_empty() {
        return None;
    }

    for &nchars in &NEEDLE_CHAR_LENGTHS {
        let needle = &page[..char_budget(page, 0, nchars)];
        if needle.is_empty() {
            continue;
        }

        let mut lo = (prev + 1).max(expected.saturating_sub(SEARCH_TOLERANCE));
        let mut hi = (expected + SEARCH_TOLERANCE + needle.len()).min(content.len());
        while lo < content.len() && !content.is_char_boundary(lo) {
            lo += 1;
        }
        while hi > 0 && !content.is_char_boundary(hi) {
            hi -= 1;
        }
        if lo >= hi {
            continue;
        }

        // (position, newline-preceded, distance from expectation)
        let mut best: Option<(usize, bool, usize)> = None;
        let region = &content[lo..hi];
        let mut from = 0usize;
        for _ in 0..MAX_CANDIDATES {
            let Some(rel) = region[from..].find(needle) else {
                break;
            };
            let abs = lo + from + rel;
            let preceded = abs > 0 && content.as_bytes()[abs - 1] == b'\n';
            let dist = abs.abs_diff(expected);

            let better = match &best {
                None => true,
                Some((_, best_nl, best_dist)) => {
                    (preceded && !*best_nl) || (preceded == *best_nl && dist < *best_dist)
                }
            };
            if better {
                best = Some((abs, preceded, dist));
            }

            from += rel + needle.len();
            if from >= region.len() {
                break;
            }
        }

        if let Some((abs, _, _)) = best {
            return Some(abs);
        }
    }

    None
}
