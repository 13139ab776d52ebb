//! # Rule Compiler
//!
//! Normalises every split rule into one of three matchable artefacts:
//!
//! * **fast-fuzzy** — a single-token fuzzy line-start rule, matched by the
//!   hand-rolled line scanner instead of a buffer-wide regex;
//! * **combinable** — a capture-free rule whose anchored body joins the
//!   single combined alternation, each branch wrapped in an `r{index}_b`
//!   group so the winning branch is identifiable;
//! * **standalone** — a rule with captures or backreferences, scanned
//!   independently.

use crate::errors::{TaqsimError, TqResult};
use crate::regex::{RegexWrapper, RegexWrapperPattern};
use crate::rules::constraints::RuleConstraints;
use crate::rules::split_rule::{Occurrence, RuleKind, SplitMode, SplitRule};
use crate::tokens::{CaptureNamer, ExpandMode, expand, single_token, table};
use crate::types::Meta;

/// How a compiled rule is matched against the joined buffer.
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// Matched by the fast line scanner; the regex is the bare token
    /// fragment anchored to the slice start.
    FastFuzzy(RegexWrapper),

    /// Participates in [`CompiledRuleSet::combined`] via its
    /// `r{index}_b` branch group.
    Combined,

    /// Scanned independently.
    Standalone(RegexWrapper),
}

/// One rule, normalised.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// The rule's declared position; lower wins at equal offsets.
    pub index: usize,

    /// The matching strategy.
    pub matcher: RuleMatcher,

    /// Where splits land relative to matches.
    pub split: SplitMode,

    /// Strip the matched marker from the emitted content
    /// (`lineStartsAfter`).
    pub strips_marker: bool,

    /// Metadata copied onto produced segments.
    pub meta: Option<Meta>,

    /// Named capture groups the rule's regex defines.
    pub capture_names: Vec<String>,

    /// Occurrence selection.
    pub occurrence: Occurrence,

    /// Sliding-window size for occurrence selection.
    pub max_span: Option<u32>,

    /// Compiled page-start guard, anchored at the end.
    pub guard: Option<RegexWrapper>,

    /// Page-id constraints.
    pub constraints: RuleConstraints,
}

/// The compiled rule set: per-rule artefacts plus the combined alternation.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    /// Per-rule artefacts, in declared order.
    pub rules: Vec<CompiledRule>,

    /// The combined alternation over all combinable rules, if any.
    pub combined: Option<RegexWrapper>,

    /// Indices of rules participating in `combined`, in declared order.
    pub combined_indices: Vec<usize>,
}

/// The branch group name for a rule index.
pub fn branch_group(index: usize) -> String {
    format!("r{index}_b")
}

/// Does the pattern use a backreference (`\1`…`\9`, `\k<name>`)?
fn has_backreference(source: &str) -> bool {
    let bytes = source.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' {
            match bytes[i + 1] {
                b'1'..=b'9' => return true,
                b'k' if bytes.get(i + 2) == Some(&b'<') => return true,
                b'\\' => i += 1,
                _ => {}
            }
        }
        i += 1;
    }
    false
}

fn invalid(
    pattern: &str,
) -> impl FnOnce(crate::regex::ErrorWrapper) -> TaqsimError + '_ {
    move |err| TaqsimError::InvalidRegex {
        pattern: pattern.to_string(),
        source: err,
    }
}

/// Compile the declared rules, in order, preserving indices.
pub fn compile_rules(rules: &[SplitRule]) -> TqResult<CompiledRuleSet> {
    let mut compiled = Vec::with_capacity(rules.len());
    let mut branches: Vec<(usize, String)> = Vec::new();
    let mut fallbacks: Vec<(usize, RegexWrapper)> = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        let kind = rule.kind()?;
        let strips_marker = matches!(kind, RuleKind::LineStartsAfter(_));

        let guard = match &rule.page_start_guard {
            Some(source) => {
                let expansion =
                    expand(source, false, ExpandMode::Template, &mut CaptureNamer::default());
                let anchored = format!("(?:{})$", expansion.source);
                Some(
                    RegexWrapperPattern::from(anchored.as_str())
                        .compile()
                        .map_err(invalid(source))?,
                )
            }
            None => None,
        };

        let push = |matcher: RuleMatcher, capture_names: Vec<String>| {
            compiled.push(CompiledRule {
                index,
                matcher,
                split: rule.effective_split(),
                strips_marker,
                meta: rule.meta.clone(),
                capture_names,
                occurrence: rule.occurrence,
                max_span: rule.max_span,
                guard,
                constraints: rule.constraints.clone(),
            });
        };

        // Fast path: a fuzzy rule whose single pattern is one plain token.
        if rule.fuzzy {
            if let RuleKind::LineStartsWith(patterns) | RuleKind::LineStartsAfter(patterns) = kind
            {
                if let [pattern] = patterns {
                    if let Some(name) = single_token(pattern) {
                        let frag = table::fragment(name).unwrap();
                        let re = RegexWrapperPattern::Basic(format!("^(?:{frag})"))
                            .compile()
                            .map_err(invalid(pattern))?;
                        push(RuleMatcher::FastFuzzy(re), Vec::new());
                        continue;
                    }
                }
            }
        }

        // Expand every pattern; one namer per rule since the patterns join
        // into one alternation.
        let mut namer = CaptureNamer::default();
        let (body, declared) = match kind {
            RuleKind::LineStartsWith(patterns) | RuleKind::LineStartsAfter(patterns) => {
                let alts = patterns
                    .iter()
                    .map(|p| expand(p, rule.fuzzy, ExpandMode::Template, &mut namer).source)
                    .collect::<Vec<_>>()
                    .join("|");
                (format!("^(?:{alts})"), patterns.join("|"))
            }
            RuleKind::Regex(source) => {
                let expansion = expand(source, rule.fuzzy, ExpandMode::Raw, &mut namer);
                (format!("(?:{})", expansion.source), source.to_string())
            }
        };

        let own = RegexWrapperPattern::from(format!("(?m){body}"))
            .compile()
            .map_err(invalid(&declared))?;

        let capture_names: Vec<String> = own.capture_names().into_iter().flatten().collect();

        if own.captures_len() > 1 || own.is_fancy() || has_backreference(&body) {
            push(RuleMatcher::Standalone(own), capture_names);
        } else {
            branches.push((index, body));
            fallbacks.push((index, own));
            push(RuleMatcher::Combined, capture_names);
        }
    }

    let mut combined_indices: Vec<usize> = branches.iter().map(|(i, _)| *i).collect();
    let combined = if branches.is_empty() {
        None
    } else {
        let source = branches
            .iter()
            .map(|(i, body)| format!("(?P<{}>{body})", branch_group(*i)))
            .collect::<Vec<_>>()
            .join("|");
        match RegexWrapperPattern::Basic(format!("(?m){source}")).compile() {
            Ok(re) => Some(re),
            Err(err) => {
                // The alternation itself failed even though every branch
                // compiled; demote the branches to standalone scanning.
                log::warn!("combined rule alternation failed to compile ({err}); demoting");
                for (index, re) in fallbacks {
                    compiled[index].matcher = RuleMatcher::Standalone(re);
                }
                combined_indices.clear();
                None
            }
        }
    };

    Ok(CompiledRuleSet {
        rules: compiled,
        combined,
        combined_indices,
    })
}
