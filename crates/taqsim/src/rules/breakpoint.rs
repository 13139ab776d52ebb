//! # Breakpoints
//!
//! Post-hoc constraints that force oversized segments to be broken
//! further. A breakpoint is either a bare pattern template or a structured
//! rule with exactly one of `pattern` / `regex` / `words`.

use serde::{Deserialize, Serialize};

use crate::errors::{TaqsimError, TqResult};
use crate::regex::{RegexWrapper, RegexWrapperPattern, word_union_pattern};
use crate::rules::constraints::RuleConstraints;
use crate::rules::split_rule::SplitMode;
use crate::tokens::{CaptureNamer, ExpandMode, expand};

/// A breakpoint declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Breakpoint {
    /// A bare pattern template. The empty pattern `""` means "fall back to
    /// the next page boundary".
    Pattern(String),

    /// A structured breakpoint rule.
    Rule(BreakpointRule),
}

impl From<&str> for Breakpoint {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<String> for Breakpoint {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<BreakpointRule> for Breakpoint {
    fn from(rule: BreakpointRule) -> Self {
        Self::Rule(rule)
    }
}

impl Default for BreakpointRule {
    fn default() -> Self {
        Self {
            pattern: None,
            regex: None,
            words: None,
            split: default_breakpoint_split(),
            skip_when: None,
            constraints: RuleConstraints::default(),
        }
    }
}

fn default_breakpoint_split() -> SplitMode {
    SplitMode::After
}

/// A structured breakpoint rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakpointRule {
    /// A pattern template (tokens expand, brackets escape).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// A raw regex (tokens expand, no escaping).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    /// A whole-word alternation with whitespace leader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<String>>,

    /// Where the split lands relative to the match; defaults to `after`.
    #[serde(default = "default_breakpoint_split")]
    pub split: SplitMode,

    /// A sibling regex that vetoes this breakpoint when it matches the
    /// remaining content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_when: Option<String>,

    /// Page-id constraints: `min`/`max` gate on the starting page,
    /// `exclude` on every page in the window.
    #[serde(flatten)]
    pub constraints: RuleConstraints,
}

/// How a compiled breakpoint finds its split position.
#[derive(Debug, Clone)]
pub enum BreakpointMatcher {
    /// Resolve to the next page boundary in the window.
    PageBoundary,

    /// Run the regex over the windowed slice.
    Regex(RegexWrapper),
}

/// A breakpoint normalised for the processor.
#[derive(Debug, Clone)]
pub struct CompiledBreakpoint {
    /// The split-position finder.
    pub matcher: BreakpointMatcher,

    /// Where the split lands relative to a regex match.
    pub split: SplitMode,

    /// Compiled veto pattern.
    pub skip_when: Option<RegexWrapper>,

    /// Page-id constraints.
    pub constraints: RuleConstraints,

    /// The declared pattern source, for diagnostics.
    pub source: String,
}

fn compile_pattern(source: &str) -> TqResult<RegexWrapper> {
    let expansion = expand(source, false, ExpandMode::Template, &mut CaptureNamer::default());
    RegexWrapperPattern::from(expansion.source.as_str())
        .compile()
        .map_err(|err| TaqsimError::InvalidRegex {
            pattern: source.to_string(),
            source: err,
        })
}

fn compile_raw(source: &str) -> TqResult<RegexWrapper> {
    let expansion = expand(source, false, ExpandMode::Raw, &mut CaptureNamer::default());
    RegexWrapperPattern::from(expansion.source.as_str())
        .compile()
        .map_err(|err| TaqsimError::InvalidRegex {
            pattern: source.to_string(),
            source: err,
        })
}

/// Normalise the declared breakpoints, in order.
pub fn compile_breakpoints(breakpoints: &[Breakpoint]) -> TqResult<Vec<CompiledBreakpoint>> {
    let mut compiled = Vec::with_capacity(breakpoints.len());

    for bp in breakpoints {
        let c = match bp {
            Breakpoint::Pattern(pattern) if pattern.is_empty() => CompiledBreakpoint {
                matcher: BreakpointMatcher::PageBoundary,
                split: default_breakpoint_split(),
                skip_when: None,
                constraints: RuleConstraints::default(),
                source: String::new(),
            },
            Breakpoint::Pattern(pattern) => CompiledBreakpoint {
                matcher: BreakpointMatcher::Regex(compile_pattern(pattern)?),
                split: default_breakpoint_split(),
                skip_when: None,
                constraints: RuleConstraints::default(),
                source: pattern.clone(),
            },
            Breakpoint::Rule(rule) => {
                let (matcher, source) = match (&rule.pattern, &rule.regex, &rule.words) {
                    (Some(p), None, None) if p.is_empty() => {
                        (BreakpointMatcher::PageBoundary, String::new())
                    }
                    (Some(p), None, None) => {
                        (BreakpointMatcher::Regex(compile_pattern(p)?), p.clone())
                    }
                    (None, Some(r), None) => {
                        (BreakpointMatcher::Regex(compile_raw(r)?), r.clone())
                    }
                    (None, None, Some(words)) => {
                        // The trailing word-boundary lookahead needs the
                        // fancy engine.
                        let pattern = word_union_pattern(words);
                        let re = RegexWrapperPattern::Fancy(pattern.clone())
                            .compile()
                            .map_err(|err| TaqsimError::InvalidRegex {
                                pattern: pattern.clone(),
                                source: err,
                            })?;
                        (BreakpointMatcher::Regex(re), pattern)
                    }
                    _ => {
                        return Err(TaqsimError::MutuallyExclusiveOptions(
                            "a breakpoint takes exactly one of pattern, regex, or words"
                                .to_string(),
                        ));
                    }
                };

                let skip_when = match &rule.skip_when {
                    Some(s) => Some(compile_raw(s)?),
                    None => None,
                };

                CompiledBreakpoint {
                    matcher,
                    split: rule.split,
                    skip_when,
                    constraints: rule.constraints.clone(),
                    source,
                }
            }
        };
        compiled.push(c);
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_is_page_boundary() {
        let compiled = compile_breakpoints(&["".into()]).unwrap();
        assert!(matches!(
            compiled[0].matcher,
            BreakpointMatcher::PageBoundary
        ));
    }

    #[test]
    fn test_pattern_expands_tokens() {
        let compiled = compile_breakpoints(&["{{tarqim}}".into()]).unwrap();
        let BreakpointMatcher::Regex(re) = &compiled[0].matcher else {
            panic!("expected regex matcher");
        };
        assert!(re.is_match("انتهى۔"));
    }

    #[test]
    fn test_words_breakpoint() {
        let rule = BreakpointRule {
            words: Some(vec!["قال".to_string(), "وروى".to_string()]),
            split: SplitMode::At,
            ..BreakpointRule::default()
        };
        let compiled = compile_breakpoints(&[Breakpoint::Rule(rule)]).unwrap();
        let BreakpointMatcher::Regex(re) = &compiled[0].matcher else {
            panic!("expected regex matcher");
        };
        assert!(re.is_match("ثم قال أحمد"));

        // A longer word sharing the prefix is not a match, even with a
        // whitespace leader present.
        assert!(re.find("ثم قالوا كذلك").is_none());
        let text = "ثم قالوا كذلك ثم قال أحمد";
        let m = re.find(text).unwrap();
        assert_eq!(&text[m.range()], " قال");
        assert_eq!(m.start, text.find(" قال أحمد").unwrap());
    }

    #[test]
    fn test_mutually_exclusive_sources() {
        let rule = BreakpointRule {
            pattern: Some("۔".to_string()),
            words: Some(vec!["قال".to_string()]),
            ..BreakpointRule::default()
        };
        assert!(matches!(
            compile_breakpoints(&[Breakpoint::Rule(rule)]),
            Err(TaqsimError::MutuallyExclusiveOptions(_))
        ));
    }

    #[test]
    fn test_invalid_regex_carries_pattern() {
        let err = compile_breakpoints(&[Breakpoint::Rule(BreakpointRule {
            regex: Some("[".to_string()),
            ..BreakpointRule::default()
        })])
        .unwrap_err();
        match err {
            TaqsimError::InvalidRegex { pattern, .. } => assert_eq!(pattern, "["),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_untagged_serde() {
        let bps: Vec<Breakpoint> = serde_json::from_value(serde_json::json!([
            "",
            "۔",
            { "words": ["قال"], "split": "after", "min": 3 },
        ]))
        .unwrap();

        assert_eq!(bps[0], Breakpoint::Pattern(String::new()));
        let Breakpoint::Rule(rule) = &bps[2] else {
            panic!("expected structured rule");
        };
        assert_eq!(rule.split, SplitMode::After);
        assert_eq!(rule.constraints.min, Some(3));
    }
}
