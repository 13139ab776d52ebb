//! # Preprocessing
//!
//! Pure `Page -> Page` transforms run before segmentation: user-supplied
//! regex replacements keyed by optional page ids, and a small set of named
//! cleanup transforms with page-range constraints.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{TaqsimError, TqResult};
use crate::regex::{RegexWrapper, RegexWrapperPattern};
use crate::text::strip_zero_width;
use crate::types::Page;

/// The accepted replacement-rule regex flags.
const FLAG_WHITELIST: &str = "gimsu";

/// A regex-based content rewrite applied before segmentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaceRule {
    /// The pattern to replace.
    pub regex: String,

    /// The replacement text; group references use `$name` / `$1`.
    pub replacement: String,

    /// Regex flags, restricted to `gimsu` (`g` is implicit).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,

    /// When present, the rule applies only to these pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ids: Option<Vec<i64>>,
}

/// A named cleanup transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    /// Strip zero-width and directional control characters.
    RemoveZeroWidth,

    /// Collapse dot runs and ellipsis characters to `...`.
    CondenseEllipsis,

    /// Move a stray conjunction waw stranded at a line end down to the
    /// start of the next line.
    FixTrailingWaw,
}

/// A transform plus optional page-id constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessStep {
    /// The transform to apply.
    pub transform: TransformKind,

    /// Minimum admitted page id, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    /// Maximum admitted page id, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl From<TransformKind> for PreprocessStep {
    fn from(transform: TransformKind) -> Self {
        Self {
            transform,
            min: None,
            max: None,
        }
    }
}

fn compile_replace(rule: &ReplaceRule) -> TqResult<RegexWrapper> {
    let inline = match &rule.flags {
        Some(flags) => {
            if flags.chars().any(|c| !FLAG_WHITELIST.contains(c)) {
                return Err(TaqsimError::InvalidFlags {
                    flags: flags.clone(),
                });
            }
            flags.chars().filter(|c| *c != 'g').collect::<String>()
        }
        None => String::new(),
    };

    let source = if inline.is_empty() {
        rule.regex.clone()
    } else {
        format!("(?{inline}){}", rule.regex)
    };

    RegexWrapperPattern::from(source.as_str())
        .compile()
        .map_err(|err| TaqsimError::InvalidRegex {
            pattern: rule.regex.clone(),
            source: err,
        })
}

/// Apply the replacement rules to every admitted page, in order.
///
/// Every rule is compiled up front, so an invalid pattern fails the call
/// before any page is rewritten.
pub fn apply_replacements(
    pages: Vec<Page>,
    rules: &[ReplaceRule],
) -> TqResult<Vec<Page>> {
    let compiled = rules
        .iter()
        .map(compile_replace)
        .collect::<TqResult<Vec<_>>>()?;

    let pages = pages
        .into_iter()
        .map(|mut page| {
            for (rule, re) in rules.iter().zip(&compiled) {
                let admitted = rule
                    .page_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&page.id));
                if admitted {
                    page.content = re.replace_all(&page.content, &rule.replacement);
                }
            }
            page
        })
        .collect();

    Ok(pages)
}

static ELLIPSIS_RE: Lazy<RegexWrapper> = Lazy::new(|| {
    RegexWrapperPattern::Basic(r"(?:\.{4,}|\u{2026}+)".to_string())
        .compile()
        .unwrap()
});

static TRAILING_WAW_RE: Lazy<RegexWrapper> = Lazy::new(|| {
    RegexWrapperPattern::Basic("[ \\t]+\u{0648}\n".to_string())
        .compile()
        .unwrap()
});

/// Apply the admitted named transforms to one page's content.
pub fn apply_preprocess_to_page(
    content: &str,
    page_id: i64,
    steps: &[PreprocessStep],
) -> String {
    let mut content = content.to_string();
    for step in steps {
        let admitted =
            step.min.is_none_or(|m| page_id >= m) && step.max.is_none_or(|m| page_id <= m);
        if !admitted {
            continue;
        }
        content = match step.transform {
            TransformKind::RemoveZeroWidth => strip_zero_width(&content),
            TransformKind::CondenseEllipsis => ELLIPSIS_RE.replace_all(&content, "..."),
            TransformKind::FixTrailingWaw => TRAILING_WAW_RE.replace_all(&content, "\nو"),
        };
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_scoped_by_page_ids() {
        let pages = vec![Page::new(1, "قال قال"), Page::new(2, "قال قال")];
        let rule = ReplaceRule {
            regex: "قال".to_string(),
            replacement: "ذكر".to_string(),
            page_ids: Some(vec![2]),
            ..ReplaceRule::default()
        };

        let out = apply_replacements(pages, &[rule]).unwrap();
        assert_eq!(out[0].content, "قال قال");
        assert_eq!(out[1].content, "ذكر ذكر");
    }

    #[test]
    fn test_replacement_group_reference() {
        let pages = vec![Page::new(1, "## 5 باب")];
        let rule = ReplaceRule {
            regex: r"## (?<num>[0-9]+)".to_string(),
            replacement: "## [$num]".to_string(),
            ..ReplaceRule::default()
        };

        let out = apply_replacements(pages, &[rule]).unwrap();
        assert_eq!(out[0].content, "## [5] باب");
    }

    #[test]
    fn test_flag_whitelist() {
        let rule = ReplaceRule {
            regex: "x".to_string(),
            flags: Some("gx".to_string()),
            ..ReplaceRule::default()
        };
        assert!(matches!(
            apply_replacements(vec![], &[rule]),
            Err(TaqsimError::InvalidFlags { flags }) if flags == "gx"
        ));

        let rule = ReplaceRule {
            regex: "QAL".to_string(),
            replacement: "ذكر".to_string(),
            flags: Some("gi".to_string()),
            ..ReplaceRule::default()
        };
        let out = apply_replacements(vec![Page::new(1, "qal")], &[rule]).unwrap();
        assert_eq!(out[0].content, "ذكر");
    }

    #[test]
    fn test_condense_ellipsis() {
        let out = apply_preprocess_to_page(
            "انتهى..... ثم \u{2026} ثم.",
            1,
            &[TransformKind::CondenseEllipsis.into()],
        );
        assert_eq!(out, "انتهى... ثم ... ثم.");
    }

    #[test]
    fn test_fix_trailing_waw() {
        let out = apply_preprocess_to_page(
            "ذهب أحمد و\nكان معه خالد",
            1,
            &[TransformKind::FixTrailingWaw.into()],
        );
        assert_eq!(out, "ذهب أحمد\nوكان معه خالد");
    }

    #[test]
    fn test_step_page_constraints() {
        let step = PreprocessStep {
            transform: TransformKind::RemoveZeroWidth,
            min: Some(5),
            max: None,
        };
        assert_eq!(apply_preprocess_to_page("أ\u{200B}ب", 1, &[step]), "أ\u{200B}ب");
        assert_eq!(apply_preprocess_to_page("أ\u{200B}ب", 5, &[step]), "أب");
    }
}
