//! # Fuzzy Transformer
//!
//! Rewrites a literal Arabic phrase into a diacritic-insensitive regex:
//! harakat in the input are dropped, an optional harakat run is injected
//! after every letter, the common letter-equivalence classes are widened,
//! and whitespace runs collapse to `\s+`.

use crate::text::is_zero_width;

/// The harakat character class: Arabic tashkeel (`U+064B`–`U+0652`,
/// shadda and sukun included) plus the dagger alif (`U+0670`).
pub const HARAKAT_CLASS: &str = "[\u{064B}-\u{0652}\u{0670}]";

/// An optional run of harakat, injected after every letter.
const HARAKAT_RUN: &str = "[\u{064B}-\u{0652}\u{0670}]*";

/// Letters interchangeable with plain alif: alif, alif madda, alif with
/// hamza above, alif with hamza below.
const ALIF_CLASS: &str = "[اآأإ]";

/// Ta marbuta vs. final ha.
const TA_MARBUTA_CLASS: &str = "[ةه]";

/// Alif maqsura vs. ya.
const MAQSURA_CLASS: &str = "[ىي]";

const TATWEEL: char = '\u{0640}';

/// Is this character in the harakat set?
pub const fn is_harakat(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}')
}

/// Is this an Arabic letter that takes harakat?
const fn is_arabic_letter(c: char) -> bool {
    matches!(c, '\u{0621}'..='\u{064A}' | '\u{0671}'..='\u{06D3}')
}

/// Remove harakat and tatweel from a phrase.
///
/// Used when grouping diacritic-variant phrases under one key.
pub fn strip_harakat(phrase: &str) -> String {
    phrase
        .chars()
        .filter(|c| !is_harakat(*c) && *c != TATWEEL)
        .collect()
}

/// Transform a literal phrase into a diacritic-insensitive regex source.
///
/// ## Arguments
/// * `literal` - The phrase as written, with or without harakat.
///
/// ## Returns
/// A regex source that matches the phrase under any harakat placement and
/// within the letter-equivalence classes.
pub fn fuzzify(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len() * 4);
    let mut pending_ws = false;

    for c in literal.chars() {
        if is_zero_width(c) || is_harakat(c) || c == TATWEEL {
            continue;
        }
        if c.is_whitespace() {
            pending_ws = true;
            continue;
        }
        if pending_ws {
            out.push_str(r"\s+");
            pending_ws = false;
        }

        match c {
            'ا' | 'آ' | 'أ' | 'إ' => {
                out.push_str(ALIF_CLASS);
                out.push_str(HARAKAT_RUN);
            }
            'ة' | 'ه' => {
                out.push_str(TA_MARBUTA_CLASS);
                out.push_str(HARAKAT_RUN);
            }
            'ى' | 'ي' => {
                out.push_str(MAQSURA_CLASS);
                out.push_str(HARAKAT_RUN);
            }
            c if is_arabic_letter(c) => {
                out.push_str(&fancy_regex::escape(c.encode_utf8(&mut [0u8; 4])));
                out.push_str(HARAKAT_RUN);
            }
            c => {
                out.push_str(&fancy_regex::escape(c.encode_utf8(&mut [0u8; 4])));
            }
        }
    }

    if pending_ws {
        out.push_str(r"\s+");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexWrapperPattern;

    fn matches(
        pattern: &str,
        haystack: &str,
    ) -> bool {
        RegexWrapperPattern::Basic(format!("^(?:{pattern})"))
            .compile()
            .unwrap()
            .is_match(haystack)
    }

    #[test]
    fn test_matches_vocalised_form() {
        let re = fuzzify("حدثنا");
        assert!(matches(&re, "حَدَّثَنَا"));
        assert!(matches(&re, "حدثنا"));
        assert!(!matches(&re, "أخبرنا"));
    }

    #[test]
    fn test_vocalised_input_equivalent_to_bare() {
        assert_eq!(fuzzify("حَدَّثَنَا"), fuzzify("حدثنا"));
    }

    #[test]
    fn test_letter_equivalence_classes() {
        let re = fuzzify("اخبرنا");
        assert!(matches(&re, "أَخْبَرَنَا"));
        assert!(matches(&re, "إخبرنا"));

        let re = fuzzify("صلاة");
        assert!(matches(&re, "صلاه"));

        let re = fuzzify("موسى");
        assert!(matches(&re, "موسي"));
    }

    #[test]
    fn test_whitespace_collapses() {
        let re = fuzzify("قال  رسول   الله");
        assert!(matches(&re, "قال رسول الله"));
        assert!(matches(&re, "قال  رسول الله"));
    }

    #[test]
    fn test_trailing_space_preserved() {
        let re = fuzzify("وروى ");
        assert!(matches(&re, "وروى أحمد"));
        assert!(!matches(&re, "وروىأحمد"));
    }

    #[test]
    fn test_metacharacters_escaped() {
        let re = fuzzify("(قال)");
        assert!(matches(&re, "(قَالَ)"));
    }

    #[test]
    fn test_zero_width_stripped() {
        assert_eq!(fuzzify("قا\u{200C}ل"), fuzzify("قال"));
    }
}
