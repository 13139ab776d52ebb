//! # Oversized-Segment Processing
//!
//! The slicing loop: window computation, exclusion breaks, ordered pattern
//! search, safe-break fallback, emission, and page-joiner finalisation.

use crate::breakpoints::boundary::{SegmentPageOffsets, reconstruct};
use crate::breakpoints::window::{Window, compute_window};
use crate::errors::{TaqsimError, TqResult};
use crate::page_map::PageMap;
use crate::rules::{
    BreakpointMatcher, CompiledBreakpoint, PageJoiner, Prefer, RuleConstraints,
    SegmentationOptions, SplitMode,
};
use crate::text::{char_budget, char_len, is_arabic_punctuation, safe_cut_position};
use crate::types::{Meta, Segment};

/// Hard iteration ceiling for the slicing loop.
const MAX_SLICE_ITERATIONS: usize = 100_000;

/// Safe-break backscan distance, in chars.
const SAFE_BREAK_BACKSCAN: usize = 100;

/// Page-prefix probe length, in chars, for drift-tolerant page advance.
const PAGE_PROBE_CHARS: usize = 24;

/// Minimum probe length, in chars, before the prefix heuristic is trusted.
const PAGE_PROBE_MIN_CHARS: usize = 10;

/// The prefix heuristic only fires this close (bytes) to the expected
/// boundary; further out, a prefix match is coincidence, not drift.
const PAGE_ADVANCE_SLACK: usize = 256;

/// Enforce `maxPages`, `maxContentLength`, and breakpoint exclusions over
/// the first-pass segments.
pub fn process_segments(
    segments: Vec<Segment>,
    map: &PageMap,
    options: &SegmentationOptions,
    breakpoints: &[CompiledBreakpoint],
) -> TqResult<Vec<Segment>> {
    let mut out = Vec::with_capacity(segments.len());

    for segment in segments {
        if quick_accept(&segment, map, options, breakpoints) {
            out.push(segment);
        } else {
            split_oversized(segment, map, options, breakpoints, &mut out)?;
        }
    }

    if options.page_joiner == PageJoiner::Space {
        for segment in &mut out {
            finalize_joiner(segment, map);
        }
    }

    Ok(out)
}

/// A segment passes through untouched when its span and length are within
/// bounds and no breakpoint excludes a page it covers.
fn quick_accept(
    segment: &Segment,
    map: &PageMap,
    options: &SegmentationOptions,
    breakpoints: &[CompiledBreakpoint],
) -> bool {
    if segment.span() > i64::from(options.max_pages) {
        return false;
    }
    if let Some(max_len) = options.max_content_length {
        if char_len(&segment.content) > max_len as usize {
            return false;
        }
    }

    let (Some(fi), Some(ti)) = (
        map.index_of_id(segment.from),
        map.index_of_id(segment.end_id()),
    ) else {
        log::warn!(
            "segment pages {}..{} not in page map; leaving unchanged",
            segment.from,
            segment.end_id()
        );
        return true;
    };

    for i in fi..=ti {
        let id = map.id_of_index(i);
        if breakpoints.iter().any(|bp| bp.constraints.excludes(id)) {
            return false;
        }
    }
    true
}

/// Every breakpoint is an unconstrained page-boundary fallback.
fn page_boundary_only(breakpoints: &[CompiledBreakpoint]) -> bool {
    !breakpoints.is_empty()
        && breakpoints.iter().all(|bp| {
            matches!(bp.matcher, BreakpointMatcher::PageBoundary)
                && bp.skip_when.is_none()
                && bp.constraints == RuleConstraints::default()
        })
}

fn split_oversized(
    segment: Segment,
    map: &PageMap,
    options: &SegmentationOptions,
    breakpoints: &[CompiledBreakpoint],
    out: &mut Vec<Segment>,
) -> TqResult<()> {
    let (Some(from_idx), Some(to_idx)) = (
        map.index_of_id(segment.from),
        map.index_of_id(segment.end_id()),
    ) else {
        log::warn!(
            "segment pages {}..{} not in page map; leaving unchanged",
            segment.from,
            segment.end_id()
        );
        out.push(segment);
        return Ok(());
    };

    let content = segment.content;
    let len = content.len();
    let offsets = reconstruct(&content, map, from_idx, to_idx);
    let ids: Vec<i64> = (from_idx..=to_idx).map(|i| map.id_of_index(i)).collect();
    let mut first = true;

    // Trivial "one segment per page" case: split at reconstructed page
    // boundaries without iterating.
    if options.max_pages == 0
        && options.max_content_length.is_none()
        && page_boundary_only(breakpoints)
    {
        for k in 0..offsets.page_count() {
            let meta = first.then(|| segment.meta.clone()).flatten();
            if emit_piece(
                &content,
                offsets.start_of(k),
                offsets.start_of(k + 1),
                &offsets,
                &ids,
                meta,
                out,
            ) {
                first = false;
            }
        }
        return Ok(());
    }

    let mut cursor = 0usize;
    let mut cur = 0usize;

    for _ in 0..MAX_SLICE_ITERATIONS {
        // Advance past whitespace at the new position.
        while let Some(c) = content[cursor..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            cursor += c.len_utf8();
        }
        if cursor >= len {
            return Ok(());
        }

        cur = advance_page(map, &offsets, &content, cursor, cur, options.max_pages);
        let win = compute_window(
            &offsets,
            &ids,
            cur,
            cursor,
            &content,
            options.max_pages,
            options.max_content_length,
        );

        // Excluded pages break at their boundary, bypassing patterns.
        if let Some(break_abs) =
            exclusion_break(breakpoints, &offsets, &ids, cur, win.end_local, cursor)
        {
            let meta = first.then(|| segment.meta.clone()).flatten();
            if emit_piece(&content, cursor, break_abs, &offsets, &ids, meta, out) {
                first = false;
            }
            cursor = break_abs;
            continue;
        }

        // The rest fits in one piece.
        if !win.length_capped && win.end_pos >= len {
            let meta = first.then(|| segment.meta.clone()).flatten();
            emit_piece(&content, cursor, len, &offsets, &ids, meta, out);
            return Ok(());
        }

        let break_rel = match find_pattern_break(
            &content,
            cursor,
            &win,
            breakpoints,
            options.prefer,
            &ids,
            cur,
            &offsets,
        ) {
            Some((rel, bp_idx)) => {
                log::debug!(
                    "split at {} resolved by breakpoint {:?}",
                    cursor + rel,
                    breakpoints[bp_idx].source
                );
                rel
            }
            None => safe_break(&content, cursor, win.end_pos),
        };

        let break_abs = (cursor + break_rel).min(len);
        let meta = first.then(|| segment.meta.clone()).flatten();
        if emit_piece(&content, cursor, break_abs, &offsets, &ids, meta, out) {
            first = false;
        }
        cursor = break_abs;
    }

    log::error!(
        "breakpoint loop exceeded {MAX_SLICE_ITERATIONS} iterations at cursor {cursor} of {len}"
    );
    Err(TaqsimError::ProgressAborted {
        iterations: MAX_SLICE_ITERATIONS,
        cursor,
        content_len: len,
    })
}

/// The break offset at the first breakpoint-excluded page in the window.
fn exclusion_break(
    breakpoints: &[CompiledBreakpoint],
    offsets: &SegmentPageOffsets,
    ids: &[i64],
    cur: usize,
    end_local: usize,
    cursor: usize,
) -> Option<usize> {
    for j in cur..=end_local {
        if breakpoints.iter().any(|bp| bp.constraints.excludes(ids[j])) {
            // Break at the excluded page's boundary; when the current page
            // itself is excluded, isolate it by breaking at its end.
            let at = if j == cur {
                offsets.start_of(cur + 1)
            } else {
                offsets.start_of(j)
            };
            return (at > cursor).then_some(at);
        }
    }
    None
}

/// Run the ordered breakpoints over the windowed slice.
///
/// Returns the break offset relative to the cursor, plus the resolving
/// breakpoint's index.
#[allow(clippy::too_many_arguments)]
fn find_pattern_break(
    content: &str,
    cursor: usize,
    win: &Window,
    breakpoints: &[CompiledBreakpoint],
    prefer: Prefer,
    ids: &[i64],
    cur: usize,
    offsets: &SegmentPageOffsets,
) -> Option<(usize, usize)> {
    if win.end_pos <= cursor {
        return None;
    }
    let slice = &content[cursor..win.end_pos];
    let remaining = &content[cursor..];

    for (bp_idx, bp) in breakpoints.iter().enumerate() {
        if !bp.constraints.in_range(ids[cur]) {
            continue;
        }
        if let Some(skip) = &bp.skip_when {
            if skip.is_match(remaining) {
                continue;
            }
        }

        match &bp.matcher {
            BreakpointMatcher::PageBoundary => {
                // A length-bounded window falls through to the safe-break
                // fallback instead of jumping a whole page.
                if win.length_capped {
                    continue;
                }
                let next = offsets.start_of(cur + 1);
                if next > cursor && next <= win.end_pos {
                    return Some((next - cursor, bp_idx));
                }
            }
            BreakpointMatcher::Regex(re) => {
                let mut chosen = None;
                for m in re.find_iter(slice) {
                    if m.is_empty() || m.start == 0 {
                        continue;
                    }
                    let rel = match bp.split {
                        SplitMode::At => m.start,
                        SplitMode::After => m.end,
                    };
                    if rel == 0 {
                        continue;
                    }
                    chosen = Some(rel);
                    if prefer == Prefer::Shorter {
                        break;
                    }
                }
                if let Some(rel) = chosen {
                    return Some((rel, bp_idx));
                }
            }
        }
    }
    None
}

/// No pattern applied: back-scan for whitespace or punctuation, then fall
/// back to a Unicode-cluster-safe cut at the raw window end.
fn safe_break(
    content: &str,
    cursor: usize,
    window_end: usize,
) -> usize {
    let len = content.len();
    let end = window_end.min(len);
    if end <= cursor {
        return content[cursor..].chars().next().map_or(1, char::len_utf8);
    }

    let slice = &content[cursor..end];
    for (count, (i, c)) in slice.char_indices().rev().enumerate() {
        if count >= SAFE_BREAK_BACKSCAN {
            break;
        }
        if c.is_whitespace() || is_arabic_punctuation(c) {
            let rel = i + c.len_utf8();
            if rel > 0 {
                return rel;
            }
        }
    }

    let adjusted = safe_cut_position(content, end);
    if adjusted > cursor {
        return adjusted - cursor;
    }
    content[cursor..].chars().next().map_or(1, char::len_utf8)
}

/// Detect page advance after a cut.
///
/// Position-based when `maxPages == 0`; otherwise offsets advance by
/// position with a prefix probe against the next page's head, tolerating
/// reconstruction drift in either direction.
fn advance_page(
    map: &PageMap,
    offsets: &SegmentPageOffsets,
    content: &str,
    cursor: usize,
    mut cur: usize,
    max_pages: u32,
) -> usize {
    if max_pages == 0 {
        return offsets.local_index_for_position(cursor);
    }

    let last = offsets.page_count() - 1;
    while cur < last && cursor >= offsets.start_of(cur + 1) {
        cur += 1;
    }

    // Reconstruction drift (stripped markers) can leave the offsets a
    // little behind the cursor; a substantial prefix match against the
    // next page's head, close to the expected boundary, confirms the
    // advance.
    if cur < last && offsets.start_of(cur + 1).saturating_sub(cursor) <= PAGE_ADVANCE_SLACK {
        let b = map.boundaries()[offsets.from_index + cur + 1];
        let page = map.buffer()[b.start..b.end].trim_start();
        let head = content[cursor..].trim_start();
        let probe = &page[..char_budget(page, 0, PAGE_PROBE_CHARS)];
        let head_probe = &head[..char_budget(head, 0, PAGE_PROBE_CHARS)];
        if probe.chars().count() >= PAGE_PROBE_MIN_CHARS
            && head_probe.chars().count() >= PAGE_PROBE_MIN_CHARS
            && (head.starts_with(probe) || page.starts_with(head_probe))
        {
            cur += 1;
        }
    }
    cur
}

/// Trim, attribute, and push one piece; reports whether it was emitted.
fn emit_piece(
    content: &str,
    start: usize,
    end: usize,
    offsets: &SegmentPageOffsets,
    ids: &[i64],
    meta: Option<Meta>,
    out: &mut Vec<Segment>,
) -> bool {
    let slice = &content[start.min(end)..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return false;
    }

    let lead = slice.len() - slice.trim_start().len();
    let t_start = start + lead;
    let t_end = t_start + trimmed.len();

    let from = ids[offsets.local_index_for_position(t_start)];
    let to = ids[offsets.local_index_for_position(t_end - 1)];

    out.push(Segment {
        content: trimmed.to_string(),
        from,
        to: (to > from).then_some(to),
        meta,
    });
    true
}

/// Replace the newline immediately before each detected page start with a
/// space; in-page newlines survive.
fn finalize_joiner(
    segment: &mut Segment,
    map: &PageMap,
) {
    let Some(to) = segment.to else {
        return;
    };
    let (Some(fi), Some(ti)) = (map.index_of_id(segment.from), map.index_of_id(to)) else {
        return;
    };

    let offsets = reconstruct(&segment.content, map, fi, ti);
    let mut bytes = std::mem::take(&mut segment.content).into_bytes();
    for k in 1..offsets.page_count() {
        let o = offsets.start_of(k);
        if o > 0 && o < bytes.len() && bytes[o - 1] == b'\n' {
            bytes[o - 1] = b' ';
        }
    }
    // SAFETY: only single-byte '\n' values were replaced with single-byte
    // ' ', so the buffer remains valid UTF-8.
    segment.content = unsafe { String::from_utf8_unchecked(bytes) };
}
