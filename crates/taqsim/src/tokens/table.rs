//! # Token Table
//!
//! The closed set of token names available in rule templates. Each plain
//! token resolves to a raw regex fragment; composite tokens resolve to a
//! template that is transitively expanded, so callers may use either the
//! composite or the underlying pair.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::fuzzy::fuzzify;

/// Narration-opening verbs recognised by the `naql` token.
const NAQL_PHRASES: &[&str] = &[
    "حدثنا",
    "حدثني",
    "أخبرنا",
    "أخبرني",
    "أنبأنا",
    "أنبأني",
    "سمعت",
];

/// The abbreviation-code alphabet for the `rumuz` token (Bukhari `خ`,
/// Muslim `م`, the sunan compilers, and the composed codes built from
/// these letters, e.g. `خت`, `عس`, `مد`).
const RUMUZ_LETTERS: &str = "بتخدسصعفقكمني";

static FRAGMENTS: Lazy<HashMap<&'static str, String>> = Lazy::new(|| {
    let mut table = HashMap::new();

    // Numerals and list furniture.
    table.insert("raqm", "[0-9\u{0660}-\u{0669}]".to_string());
    table.insert("raqms", "[0-9\u{0660}-\u{0669}]+".to_string());
    table.insert("harf", "[\u{0621}-\u{064A}]".to_string());
    table.insert("dash", "[-\u{2013}\u{2014}\u{0640}]".to_string());
    table.insert("bullet", "[\u{2022}*\u{00B0}-]".to_string());
    table.insert("tarqim", "[-.:\u{060C}\u{061B}\u{06D4}]".to_string());

    // Structural phrases, harakat-tolerant.
    table.insert("bab", format!("(?:ال)?{}", fuzzify("باب")));
    table.insert("kitab", format!("(?:ال)?{}", fuzzify("كتاب")));
    table.insert("fasl", format!("(?:ال)?{}", fuzzify("فصل")));

    let naql = NAQL_PHRASES
        .iter()
        .map(|p| fuzzify(p))
        .collect::<Vec<_>>()
        .join("|");
    table.insert("naql", format!("(?:{naql})"));

    table.insert(
        "basmala",
        format!("(?:\u{FDFD}|{})", fuzzify("بسم الله الرحمن الرحيم")),
    );

    table.insert(
        "rumuz",
        format!("(?:[{RUMUZ_LETTERS}]{{1,3}})(?:\\s+[{RUMUZ_LETTERS}]{{1,3}})*"),
    );

    table
});

/// Composite tokens, expressed as templates over plain tokens.
const COMPOSITES: &[(&str, &str)] = &[
    ("numbered", "{{raqms}} {{dash}} "),
    ("bulleted", "{{bullet}} "),
];

/// The raw regex fragment for a plain token name.
pub fn fragment(name: &str) -> Option<&'static str> {
    FRAGMENTS.get(name).map(String::as_str)
}

/// The template text for a composite token name.
pub fn composite(name: &str) -> Option<&'static str> {
    COMPOSITES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, tmpl)| *tmpl)
}

/// Is this a known token name (plain or composite)?
pub fn is_token(name: &str) -> bool {
    fragment(name).is_some() || composite(name).is_some()
}

/// All known token names.
pub fn token_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = FRAGMENTS.keys().copied().collect();
    names.extend(COMPOSITES.iter().map(|(n, _)| *n));
    names.sort_unstable();
    names
}

/// If the whole pattern is exactly one plain token (`{{name}}`), return the
/// token name.
///
/// Composite tokens do not qualify; the fast line scanner only handles
/// single-fragment rules.
pub fn single_token(pattern: &str) -> Option<&str> {
    let trimmed = pattern.trim();
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains(':') {
        return None;
    }
    fragment(inner).map(|_| inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexWrapperPattern;

    fn compiled(name: &str) -> crate::regex::RegexWrapper {
        RegexWrapperPattern::Basic(format!("^(?:{})", fragment(name).unwrap()))
            .compile()
            .unwrap()
    }

    #[test]
    fn test_all_fragments_compile() {
        for name in token_names() {
            if let Some(frag) = fragment(name) {
                RegexWrapperPattern::Basic(frag.to_string())
                    .compile()
                    .unwrap_or_else(|err| panic!("token {name} failed to compile: {err}"));
            }
        }
    }

    #[test]
    fn test_raqms_matches_both_numeral_systems() {
        let re = compiled("raqms");
        assert!(re.is_match("١٢٣ باب"));
        assert!(re.is_match("123 باب"));
        assert!(!re.is_match("باب"));
    }

    #[test]
    fn test_bab_matches_definite_and_vocalised() {
        let re = compiled("bab");
        assert!(re.is_match("باب الصلاة"));
        assert!(re.is_match("الباب الأول"));
        assert!(re.is_match("بَابُ الإيمان"));
        assert!(!re.is_match("كتاب الصلاة"));
    }

    #[test]
    fn test_basmala_ligature_and_phrase() {
        let re = compiled("basmala");
        assert!(re.is_match("\u{FDFD}"));
        assert!(re.is_match("بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ"));
    }

    #[test]
    fn test_naql_variants() {
        let re = compiled("naql");
        assert!(re.is_match("حَدَّثَنَا سفيان"));
        assert!(re.is_match("أخبرنا مالك"));
        assert!(!re.is_match("قال أحمد"));
    }

    #[test]
    fn test_rumuz_clusters() {
        let re = compiled("rumuz");
        assert!(re.is_match("خت"));
        assert!(re.is_match("دت عس ق"));
    }

    #[test]
    fn test_single_token_detection() {
        assert_eq!(single_token("{{raqms}}"), Some("raqms"));
        assert_eq!(single_token("  {{bab}}  "), Some("bab"));
        assert_eq!(single_token("{{raqms:num}}"), None);
        assert_eq!(single_token("{{numbered}}"), None);
        assert_eq!(single_token("{{raqms}} {{dash}}"), None);
        assert_eq!(single_token("{{nope}}"), None);
    }
}
