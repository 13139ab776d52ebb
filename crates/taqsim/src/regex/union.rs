//! # Union Patterns

/// Create a union pattern of escaped exact matches.
///
/// ## Arguments
/// * `alts` - A slice of string-like alternatives to union.
///
/// ## Returns
/// A pattern source matching any of the escaped alternatives.
pub fn exact_match_union_pattern<S: AsRef<str>>(alts: &[S]) -> String {
    let parts = alts
        .iter()
        .map(|s| fancy_regex::escape(s.as_ref()).into_owned())
        .collect::<Vec<_>>();
    format!("(?:{})", parts.join("|"))
}

/// Create a whole-word union pattern with a whitespace leader.
///
/// Used by `words` breakpoints: the pattern matches any of the words when
/// preceded by whitespace and not followed by a word character, so splits
/// land at whole words rather than inside a longer word sharing the
/// prefix. The leading whitespace is part of the match; the split cursor
/// advances past it afterwards.
///
/// The trailing lookahead makes this a `fancy_regex`-only pattern.
pub fn word_union_pattern<S: AsRef<str>>(words: &[S]) -> String {
    format!(r"\s{}(?!\w)", exact_match_union_pattern(words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::RegexWrapperPattern;

    #[test]
    fn test_exact_match_union() {
        let alternatives = ["وروى", "[x]", "وذكر"];
        let pattern = exact_match_union_pattern(&alternatives);
        assert_eq!(pattern, r"(?:وروى|\[x\]|وذكر)");

        let re = RegexWrapperPattern::from(pattern).compile().unwrap();
        let text = "وروى أحمد [x] وذكر خالد";
        assert_eq!(re.find_iter(text).count(), 3);
    }

    #[test]
    fn test_word_union_needs_leader() {
        let pattern = word_union_pattern(&["قال"]);
        let re = RegexWrapperPattern::from(pattern).compile().unwrap();

        // Word-initial at offset 0 has no leader and is not matched.
        assert!(re.find("قال أحمد").is_none());

        let m = re.find("حدثنا سفيان قال أحمد").unwrap();
        assert_eq!(&"حدثنا سفيان قال أحمد"[m.range()], " قال");
    }

    #[test]
    fn test_word_union_rejects_longer_word() {
        let pattern = word_union_pattern(&["قال"]);
        let re = RegexWrapperPattern::from(pattern).compile().unwrap();
        assert!(re.is_fancy());

        // "قالوا" shares the prefix but is a different word.
        assert!(re.find("ثم قالوا كذلك").is_none());
        let text = "ثم قالوا كذلك قال أحمد";
        let m = re.find(text).unwrap();
        assert_eq!(m.start, text.find(" قال أحمد").unwrap());

        // A word at the end of the haystack still matches.
        assert!(re.find("ثم قال").is_some());
    }
}
