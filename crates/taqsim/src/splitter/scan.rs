//! # Match Collection
//!
//! One `captures_iter` pass for the combined alternation, one per
//! standalone rule, and a hand-rolled line scanner for the fast-fuzzy
//! rules.

use crate::page_map::PageMap;
use crate::rules::compiler::{CompiledRuleSet, RuleMatcher, branch_group};

/// A raw rule match in the joined buffer, before selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// The producing rule's index.
    pub rule_index: usize,

    /// Match start, as a byte offset in the joined buffer.
    pub start: usize,

    /// Match end, exclusive.
    pub end: usize,

    /// Named captures extracted from the match, in group order.
    pub captures: Vec<(String, String)>,
}

/// Collect every rule match over the joined buffer.
///
/// The result is sorted by `(start, rule_index)`.
pub fn collect_matches(
    map: &PageMap,
    set: &CompiledRuleSet,
) -> Vec<RuleMatch> {
    let buffer = map.buffer();
    let mut matches = Vec::new();

    // One pass for all combinable rules.
    if let Some(combined) = &set.combined {
        for caps in combined.captures_iter(buffer) {
            let winner = set
                .combined_indices
                .iter()
                .copied()
                .find_map(|i| caps.name(&branch_group(i)).map(|span| (i, span)));
            let Some((rule_index, span)) = winner else {
                continue;
            };
            if span.is_empty() {
                continue;
            }
            matches.push(RuleMatch {
                rule_index,
                start: span.start,
                end: span.end,
                captures: Vec::new(),
            });
        }
    }

    // Standalone rules scan independently.
    for rule in &set.rules {
        let RuleMatcher::Standalone(re) = &rule.matcher else {
            continue;
        };
        for caps in re.captures_iter(buffer) {
            let span = caps.entire();
            if span.is_empty() {
                continue;
            }
            let captures = rule
                .capture_names
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|s| (name.clone(), buffer[s.range()].to_string()))
                })
                .collect();
            matches.push(RuleMatch {
                rule_index: rule.index,
                start: span.start,
                end: span.end,
                captures,
            });
        }
    }

    // Fast-fuzzy rules test each line start directly.
    let fast: Vec<_> = set
        .rules
        .iter()
        .filter(|r| matches!(r.matcher, RuleMatcher::FastFuzzy(_)))
        .collect();
    if !fast.is_empty() && !buffer.is_empty() {
        let mut pos = 0usize;
        let mut page_idx = 0usize;
        loop {
            while page_idx + 1 < map.page_count()
                && map.boundaries()[page_idx + 1].start <= pos
            {
                page_idx += 1;
            }
            let id = map.id_of_index(page_idx);

            for rule in &fast {
                if !rule.constraints.admits(id) {
                    continue;
                }
                let RuleMatcher::FastFuzzy(re) = &rule.matcher else {
                    continue;
                };
                if let Some(m) = re.find(&buffer[pos..]) {
                    if m.end > 0 {
                        matches.push(RuleMatch {
                            rule_index: rule.index,
                            start: pos,
                            end: pos + m.end,
                            captures: Vec::new(),
                        });
                    }
                }
            }

            match buffer[pos..].find('\n') {
                Some(rel) if pos + rel + 1 < buffer.len() => pos += rel + 1,
                _ => break,
            }
        }
    }

    matches.sort_by_key(|m| (m.start, m.rule_index));
    matches
}
