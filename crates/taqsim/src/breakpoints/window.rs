//! # Window Computation
//!
//! Given the current cursor and page, computes how far a single piece may
//! extend: the largest run of pages whose id span stays within `maxPages`,
//! capped by `maxContentLength`.

use crate::breakpoints::boundary::SegmentPageOffsets;
use crate::text::char_budget;

/// One iteration's split window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Local index of the last page inside the window.
    pub end_local: usize,

    /// Content byte offset where the window ends (start of the page after
    /// the window, or the length cap).
    pub end_pos: usize,

    /// The window was shortened by `maxContentLength`.
    pub length_capped: bool,
}

/// Compute the window starting at `cursor` on local page `cur`.
///
/// With `max_pages == 0` the window is exactly the current page.
pub fn compute_window(
    offsets: &SegmentPageOffsets,
    ids: &[i64],
    cur: usize,
    cursor: usize,
    content: &str,
    max_pages: u32,
    max_content_length: Option<u32>,
) -> Window {
    let last = ids.len() - 1;

    let mut end_local = cur;
    if max_pages > 0 {
        while end_local < last && ids[end_local + 1] - ids[cur] <= i64::from(max_pages) {
            end_local += 1;
        }
    }

    let mut end_pos = offsets.start_of(end_local + 1);
    let mut length_capped = false;
    if let Some(max_len) = max_content_length {
        let cap = char_budget(content, cursor.min(content.len()), max_len as usize);
        if cap < end_pos {
            end_pos = cap;
            length_capped = true;
        }
    }

    Window {
        end_local,
        end_pos,
        length_capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::boundary::reconstruct;
    use crate::page_map::PageMap;
    use crate::types::Page;

    fn setup() -> (PageMap, String, Vec<i64>) {
        let pages = vec![
            Page::new(1, "ابجد"),
            Page::new(2, "هوزح"),
            Page::new(4, "طيكل"),
            Page::new(5, "منسع"),
        ];
        let map = PageMap::build(&pages);
        let content = map.buffer().to_string();
        let ids = vec![1, 2, 4, 5];
        (map, content, ids)
    }

    #[test]
    fn test_zero_max_pages_is_current_page() {
        let (map, content, ids) = setup();
        let offsets = reconstruct(&content, &map, 0, 3);

        let w = compute_window(&offsets, &ids, 0, 0, &content, 0, None);
        assert_eq!(w.end_local, 0);
        assert_eq!(w.end_pos, offsets.start_of(1));
    }

    #[test]
    fn test_span_counts_ids_not_indices() {
        let (map, content, ids) = setup();
        let offsets = reconstruct(&content, &map, 0, 3);

        // Pages [1, 2, 4, 5]: a span of 1 from page 1 admits page 2 only;
        // page 4 is two ids away.
        let w = compute_window(&offsets, &ids, 0, 0, &content, 1, None);
        assert_eq!(w.end_local, 1);

        let w = compute_window(&offsets, &ids, 0, 0, &content, 3, None);
        assert_eq!(w.end_local, 2);

        let w = compute_window(&offsets, &ids, 0, 0, &content, 4, None);
        assert_eq!(w.end_local, 3);
        assert_eq!(w.end_pos, content.len());
    }

    #[test]
    fn test_length_cap_shortens_window() {
        let (map, content, ids) = setup();
        let offsets = reconstruct(&content, &map, 0, 3);

        let w = compute_window(&offsets, &ids, 0, 0, &content, 4, Some(3));
        assert!(w.length_capped);
        assert_eq!(w.end_pos, char_budget(&content, 0, 3));
    }
}
