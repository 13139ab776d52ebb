//! # Pattern Analysis
//!
//! A heuristic miner for candidate split patterns: counts the most common
//! line-start word sequences across pages, grouping diacritic variants
//! under one key.

use std::collections::HashMap;

use crate::fuzzy::strip_harakat;
use crate::types::Page;

/// One mined line-start prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSuggestion {
    /// The prefix, harakat-stripped.
    pub prefix: String,

    /// How many lines start with it.
    pub count: usize,

    /// The pages it appears on, ascending and de-duplicated.
    pub pages: Vec<i64>,
}

/// Mine the most common line-start prefixes.
///
/// ## Arguments
/// * `pages` - The input pages.
/// * `max_words` - Prefix length, in whitespace-separated words.
/// * `min_count` - Drop prefixes rarer than this.
///
/// ## Returns
/// Suggestions ordered by descending count, then by prefix.
pub fn common_line_starts(
    pages: &[Page],
    max_words: usize,
    min_count: usize,
) -> Vec<PatternSuggestion> {
    let mut table: HashMap<String, (usize, Vec<i64>)> = HashMap::new();

    for page in pages {
        for line in page.content.lines() {
            let prefix = line
                .split_whitespace()
                .take(max_words)
                .collect::<Vec<_>>()
                .join(" ");
            let key = strip_harakat(&prefix);
            if key.chars().count() < 2 {
                continue;
            }

            let entry = table.entry(key).or_default();
            entry.0 += 1;
            if entry.1.last() != Some(&page.id) {
                entry.1.push(page.id);
            }
        }
    }

    let mut suggestions: Vec<PatternSuggestion> = table
        .into_iter()
        .filter(|(_, (count, _))| *count >= min_count)
        .map(|(prefix, (count, pages))| PatternSuggestion {
            prefix,
            count,
            pages,
        })
        .collect();

    suggestions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.prefix.cmp(&b.prefix)));
    suggestions
}
