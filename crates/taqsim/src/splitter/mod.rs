//! # First-Pass Splitter
//!
//! Collects split points by scanning the joined buffer with the combined
//! alternation, the standalone regexes, and the fast-fuzzy line scanner;
//! applies guard, constraint, priority, and occurrence selection; and
//! materialises first-pass segments between consecutive split points.

mod materialize;
mod scan;
mod select;

pub use materialize::materialize;
pub use scan::{RuleMatch, collect_matches};
pub use select::{SplitPoint, select_points};

use crate::page_map::PageMap;
use crate::rules::compiler::CompiledRuleSet;
use crate::types::Segment;

/// Run the complete first pass: scan, select, materialise.
pub fn first_pass(
    map: &PageMap,
    set: &CompiledRuleSet,
) -> Vec<Segment> {
    let matches = collect_matches(map, set);
    let points = select_points(map, set, matches);
    materialize(map, set, &points)
}
