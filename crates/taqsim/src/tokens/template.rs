//! # Template Expander
//!
//! Resolves `{{name}}`, `{{name:capture}}`, and `{{:capture}}` placeholders
//! inside rule patterns to raw regex fragments, tracking named-capture
//! identity and de-duplicating capture names.

use std::collections::HashMap;

use crate::fuzzy::fuzzify;
use crate::tokens::table;

/// The result of expanding one pattern template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The expanded regex source.
    pub source: String,

    /// The capture names assigned in `source`, in order of appearance.
    pub capture_names: Vec<String>,
}

/// How literal (non-token) text in a template is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// Parentheses, brackets, and braces outside of tokens are escaped.
    Template,

    /// Literal text passes through untouched (the `regex:` rule field).
    Raw,
}

/// Assigns capture names, suffixing duplicates `_2`, `_3`, … so the
/// resulting regex stays valid.
///
/// One namer is shared across all patterns of a rule, since they join into
/// a single alternation.
#[derive(Debug, Default)]
pub struct CaptureNamer {
    used: HashMap<String, usize>,
}

impl CaptureNamer {
    /// Assign a unique group name derived from `base`.
    pub fn assign(
        &mut self,
        base: &str,
    ) -> String {
        let base = sanitize_group_name(base);
        let count = self.used.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}_{count}")
        }
    }
}

/// Restrict a capture name to regex group-name syntax.
fn sanitize_group_name(base: &str) -> String {
    let mut name: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.chars().next().unwrap().is_ascii_digit() {
        name.insert(0, 'c');
    }
    name
}

/// Expand a pattern template into a regex source plus its capture names.
///
/// ## Arguments
/// * `pattern` - The template text.
/// * `fuzzy` - Pass literal runs through the fuzzy transformer.
/// * `mode` - Literal escaping mode; `Raw` for the `regex:` rule field.
/// * `namer` - Capture-name dedup state, shared per rule.
///
/// Unknown token names are kept as escaped literal text and logged at
/// `warn`; they never fail the call.
pub fn expand(
    pattern: &str,
    fuzzy: bool,
    mode: ExpandMode,
    namer: &mut CaptureNamer,
) -> Expansion {
    let mut source = String::with_capacity(pattern.len() * 2);
    let mut capture_names = Vec::new();

    let mut rest = pattern;
    while let Some(open) = rest.find("{{") {
        push_literal(&mut source, &rest[..open], fuzzy, mode);

        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            // Unterminated token opener: keep it as literal text.
            push_literal(&mut source, "{{", fuzzy, mode);
            rest = after_open;
            continue;
        };

        let inner = &after_open[..close];
        expand_token(inner, fuzzy, namer, &mut source, &mut capture_names);
        rest = &after_open[close + 2..];
    }
    push_literal(&mut source, rest, fuzzy, mode);

    Expansion {
        source,
        capture_names,
    }
}

fn expand_token(
    inner: &str,
    fuzzy: bool,
    namer: &mut CaptureNamer,
    source: &mut String,
    capture_names: &mut Vec<String>,
) {
    let (name, capture) = match inner.split_once(':') {
        Some((name, capture)) => (name, Some(capture)),
        None => (inner, None),
    };

    if name.is_empty() {
        // {{:capture}} is a free content capture.
        let Some(capture) = capture.filter(|c| !c.is_empty()) else {
            log::warn!("empty token {{{{{inner}}}}} kept as literal");
            push_literal(source, &format!("{{{{{inner}}}}}"), fuzzy, ExpandMode::Template);
            return;
        };
        let assigned = namer.assign(capture);
        source.push_str(&format!("(?P<{assigned}>.+)"));
        capture_names.push(assigned);
        return;
    }

    if let Some(template) = table::composite(name) {
        // Composites are transitively expanded before tokenisation.
        let nested = expand(template, fuzzy, ExpandMode::Template, namer);
        capture_names.extend(nested.capture_names.iter().cloned());
        match capture {
            Some(capture) => {
                let assigned = namer.assign(capture);
                source.push_str(&format!("(?P<{assigned}>{})", nested.source));
                capture_names.push(assigned);
            }
            None => {
                source.push_str(&format!("(?:{})", nested.source));
            }
        }
        return;
    }

    if let Some(frag) = table::fragment(name) {
        match capture {
            Some(capture) => {
                let assigned = namer.assign(capture);
                source.push_str(&format!("(?P<{assigned}>{frag})"));
                capture_names.push(assigned);
            }
            None => {
                source.push_str(&format!("(?:{frag})"));
            }
        }
        return;
    }

    log::warn!("unknown token {{{{{name}}}}} kept as literal");
    push_literal(source, &format!("{{{{{inner}}}}}"), fuzzy, ExpandMode::Template);
}

fn push_literal(
    source: &mut String,
    literal: &str,
    fuzzy: bool,
    mode: ExpandMode,
) {
    if literal.is_empty() {
        return;
    }
    match mode {
        ExpandMode::Raw => source.push_str(literal),
        ExpandMode::Template if fuzzy => source.push_str(&fuzzify(literal)),
        ExpandMode::Template => {
            for c in literal.chars() {
                if matches!(c, '(' | ')' | '[' | ']' | '{' | '}') {
                    source.push('\\');
                }
                source.push(c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexWrapperPattern;

    fn expand_one(
        pattern: &str,
        fuzzy: bool,
    ) -> Expansion {
        expand(pattern, fuzzy, ExpandMode::Template, &mut CaptureNamer::default())
    }

    #[test]
    fn test_plain_token() {
        let exp = expand_one("{{raqms}}", false);
        assert_eq!(exp.source, "(?:[0-9\u{0660}-\u{0669}]+)");
        assert!(exp.capture_names.is_empty());
    }

    #[test]
    fn test_named_capture_token() {
        let exp = expand_one("## {{raqms:num}}", false);
        assert_eq!(exp.capture_names, vec!["num"]);

        let re = RegexWrapperPattern::from(exp.source).compile().unwrap();
        let caps = re.captures_iter("## ٤٢ باب").next().unwrap();
        let span = caps.name("num").unwrap();
        assert_eq!(span.range(), 3..7);
    }

    #[test]
    fn test_duplicate_captures_suffixed() {
        let exp = expand_one("{{raqms:num}}{{dash}}{{raqms:num}}", false);
        assert_eq!(exp.capture_names, vec!["num", "num_2"]);
        RegexWrapperPattern::from(exp.source).compile().unwrap();
    }

    #[test]
    fn test_free_content_capture() {
        let exp = expand_one("{{bab}} {{:title}}", true);
        assert_eq!(exp.capture_names, vec!["title"]);

        let re = RegexWrapperPattern::from(format!("^{}", exp.source))
            .compile()
            .unwrap();
        let caps = re.captures_iter("باب الإيمان").next().unwrap();
        let span = caps.name("title").unwrap();
        assert_eq!(&"باب الإيمان"[span.range()], "الإيمان");
    }

    #[test]
    fn test_composite_transitive_expansion() {
        let composite = expand_one("{{numbered}}", false);
        let spelled = expand_one("{{raqms}} {{dash}} ", false);
        assert_eq!(composite.source, format!("(?:{})", spelled.source));

        let re = RegexWrapperPattern::from(composite.source)
            .compile()
            .unwrap();
        assert!(re.is_match("١٢ - باب"));
    }

    #[test]
    fn test_brackets_escaped_outside_tokens() {
        let exp = expand_one("(تنبيه)", false);
        assert_eq!(exp.source, r"\(تنبيه\)");
        // Regex escapes like \s survive template mode untouched.
        let exp = expand_one(r"##\s*{{dash}}", false);
        assert!(exp.source.starts_with(r"##\s*"));
    }

    #[test]
    fn test_raw_mode_passthrough() {
        let exp = expand(
            r"^\(باب\)",
            false,
            ExpandMode::Raw,
            &mut CaptureNamer::default(),
        );
        assert_eq!(exp.source, r"^\(باب\)");
    }

    #[test]
    fn test_unknown_token_is_literal() {
        let exp = expand_one("{{majhul}}", false);
        assert_eq!(exp.source, r"\{\{majhul\}\}");
    }

    #[test]
    fn test_fuzzy_literals_tokens_untouched() {
        let exp = expand_one("{{raqms}} باب", true);
        assert!(exp.source.starts_with("(?:[0-9"));
        assert!(exp.source.contains(r"\s+"));
    }
}
