//! # Segment Materialisation
//!
//! Walks the joined buffer between consecutive split points and emits
//! trimmed, page-attributed segments.

use crate::page_map::PageMap;
use crate::rules::compiler::CompiledRuleSet;
use crate::splitter::select::SplitPoint;
use crate::types::{Meta, Segment};

/// Materialise segments between consecutive split points.
///
/// Content preceding the first split point becomes a segment only if some
/// rule admits the first page id (or no rules exist at all, the
/// breakpoint-only mode, where the whole buffer is one segment).
pub fn materialize(
    map: &PageMap,
    set: &CompiledRuleSet,
    points: &[SplitPoint],
) -> Vec<Segment> {
    let buffer = map.buffer();
    let mut segments = Vec::with_capacity(points.len() + 1);

    let first_id = map.id_at(0);
    let leading_admitted =
        set.rules.is_empty() || set.rules.iter().any(|r| r.constraints.admits(first_id));

    if points.is_empty() {
        if leading_admitted {
            emit(map, 0, buffer.len(), None, &mut segments);
        }
        return segments;
    }

    if points[0].index > 0 && leading_admitted {
        emit(map, 0, points[0].index, None, &mut segments);
    }

    for (i, point) in points.iter().enumerate() {
        let start = (point.index + point.content_start_offset).min(buffer.len());
        let end = match points.get(i + 1) {
            Some(next) => next.index,
            None => buffer.len(),
        };
        if start < end {
            emit(map, start, end, point.meta.clone(), &mut segments);
        }
    }

    segments
}

/// Trim the slice, attribute it by its post-trim byte range, and push it.
fn emit(
    map: &PageMap,
    start: usize,
    end: usize,
    meta: Option<Meta>,
    segments: &mut Vec<Segment>,
) {
    let slice = &map.buffer()[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }

    let lead = slice.len() - slice.trim_start().len();
    let content_start = start + lead;
    let content_end = content_start + trimmed.len();

    let from = map.id_at(content_start);
    let to = map.id_at(content_end - 1);

    segments.push(Segment {
        content: trimmed.to_string(),
        from,
        to: (to > from).then_some(to),
        meta,
    });
}
