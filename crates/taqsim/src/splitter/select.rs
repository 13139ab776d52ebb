//! # Split-Point Selection
//!
//! Applies the page-start guard, constraint filtering, occurrence
//! selection over sliding windows, and priority de-duplication, then
//! converts the surviving matches into split points.

use crate::page_map::PageMap;
use crate::rules::compiler::{CompiledRule, CompiledRuleSet};
use crate::rules::{Occurrence, SplitMode};
use crate::splitter::scan::RuleMatch;
use crate::types::Meta;

/// A chosen split position in the joined buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPoint {
    /// Byte offset of the split in the joined buffer.
    pub index: usize,

    /// Length of a stripped marker (`lineStartsAfter`); the following
    /// segment's content starts this many bytes past `index`.
    pub content_start_offset: usize,

    /// The producing rule's index.
    pub rule_index: usize,

    /// Rule metadata merged with named captures, attached to the segment
    /// beginning at this point.
    pub meta: Option<Meta>,
}

/// Filter, select, and order the raw matches into split points.
pub fn select_points(
    map: &PageMap,
    set: &CompiledRuleSet,
    matches: Vec<RuleMatch>,
) -> Vec<SplitPoint> {
    // Guard and constraint filtering.
    let admitted: Vec<RuleMatch> = matches
        .into_iter()
        .filter(|m| {
            let rule = &set.rules[m.rule_index];
            rule.constraints.admits(map.id_at(m.start)) && passes_guard(map, rule, m)
        })
        .collect();

    // Occurrence selection, per rule.
    let mut chosen: Vec<RuleMatch> = Vec::with_capacity(admitted.len());
    for rule in &set.rules {
        let rule_matches: Vec<RuleMatch> = admitted
            .iter()
            .filter(|m| m.rule_index == rule.index)
            .cloned()
            .collect();
        chosen.extend(select_occurrence(map, rule, rule_matches));
    }

    // Priority de-duplication: at equal offsets the lower rule index wins.
    let mut points: Vec<SplitPoint> = chosen.into_iter().map(|m| to_point(set, m)).collect();
    points.sort_by_key(|p| (p.index, p.rule_index));
    points.dedup_by_key(|p| p.index);
    points
}

/// Page-start guard: a match at the start of page `i > 0` survives only if
/// the previous page's last non-whitespace character matches the guard.
fn passes_guard(
    map: &PageMap,
    rule: &CompiledRule,
    m: &RuleMatch,
) -> bool {
    let Some(guard) = &rule.guard else {
        return true;
    };

    let idx = map.index_at(m.start);
    if idx == 0 || map.boundaries()[idx].start != m.start {
        return true;
    }

    let prev = map.boundaries()[idx - 1];
    let prev_content = map.buffer()[prev.start..prev.end].trim_end();
    let Some(last) = prev_content.chars().last() else {
        log::debug!("page-start guard at offset {} found empty previous page", m.start);
        return false;
    };

    let ok = guard.is_match(last.encode_utf8(&mut [0u8; 4]));
    if !ok {
        log::debug!(
            "page-start guard rejected match at offset {} (previous page ends {last:?})",
            m.start
        );
    }
    ok
}

/// Apply `occurrence` / `maxSpan` selection to one rule's matches.
///
/// With a window, consecutive matches whose page ids fall within `maxSpan`
/// of the window head form a group; the first or last match of each group
/// is emitted, and the window advances past the chosen match's page.
fn select_occurrence(
    map: &PageMap,
    rule: &CompiledRule,
    matches: Vec<RuleMatch>,
) -> Vec<RuleMatch> {
    if rule.occurrence == Occurrence::All || matches.is_empty() {
        return matches;
    }

    let Some(max_span) = rule.max_span else {
        let pick = match rule.occurrence {
            Occurrence::First => matches.into_iter().next(),
            _ => matches.into_iter().next_back(),
        };
        return pick.into_iter().collect();
    };

    let mut out = Vec::new();
    let mut i = 0;
    while i < matches.len() {
        let head_page = map.id_at(matches[i].start);
        let mut j = i;
        while j + 1 < matches.len()
            && map.id_at(matches[j + 1].start) - head_page <= i64::from(max_span)
        {
            j += 1;
        }

        let pick = match rule.occurrence {
            Occurrence::First => i,
            _ => j,
        };
        out.push(matches[pick].clone());

        // Advance past the chosen match's page.
        let past = map.id_at(matches[pick].start);
        i = j + 1;
        while i < matches.len() && map.id_at(matches[i].start) <= past {
            i += 1;
        }
    }
    out
}

fn to_point(
    set: &CompiledRuleSet,
    m: RuleMatch,
) -> SplitPoint {
    let rule = &set.rules[m.rule_index];

    let (index, content_start_offset) = if rule.strips_marker {
        (m.start, m.end - m.start)
    } else {
        match rule.split {
            SplitMode::At => (m.start, 0),
            SplitMode::After => (m.end, 0),
        }
    };

    let mut meta = rule.meta.clone();
    if !m.captures.is_empty() {
        let target = meta.get_or_insert_with(Meta::new);
        for (name, text) in m.captures {
            target.insert(name, serde_json::Value::String(text));
        }
    }

    SplitPoint {
        index,
        content_start_offset,
        rule_index: m.rule_index,
        meta,
    }
}
