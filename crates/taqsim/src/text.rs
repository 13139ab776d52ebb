//! # Shared Text Utilities
//!
//! Line-ending normalisation, zero-width stripping, HTML tag stripping, and
//! the Unicode-cluster-safe cut adjustment used by the breakpoint fallback.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::regex::{RegexWrapper, RegexWrapperPattern};

/// Normalise `\r\n` and bare `\r` line endings to `\n`.
pub fn normalize_line_endings(content: &str) -> Cow<'_, str> {
    if !content.contains('\r') {
        return Cow::Borrowed(content);
    }
    Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Is this one of the zero-width / directional control characters the
/// segmenter strips before matching?
///
/// The recognised set: `U+200B`–`U+200F`, `U+202A`–`U+202E`,
/// `U+2060`–`U+2064`, and `U+FEFF`.
pub const fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

/// Remove all zero-width control characters.
pub fn strip_zero_width(content: &str) -> String {
    content.chars().filter(|c| !is_zero_width(*c)).collect()
}

static HTML_TAG_RE: Lazy<RegexWrapper> = Lazy::new(|| {
    RegexWrapperPattern::Basic(r"</?[a-zA-Z][^>]*>".to_string())
        .compile()
        .unwrap()
});

/// Remove HTML tags, keeping the text between them.
pub fn strip_html_tags(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for m in HTML_TAG_RE.find_iter(content) {
        out.push_str(&content[last..m.start]);
        last = m.end;
    }
    out.push_str(&content[last..]);
    out
}

/// Is this a punctuation character the safe-break fallback may split after?
pub const fn is_arabic_punctuation(c: char) -> bool {
    matches!(
        c,
        '\u{060C}' | '\u{061B}' | '\u{061F}' | '\u{06D4}' | '\u{066D}'
            | '.' | '!' | '?' | ':' | ';'
    )
}

/// Round `pos` down to the nearest `char` boundary.
pub fn floor_char_boundary(
    s: &str,
    mut pos: usize,
) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    while pos > 0 && !s.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Would a piece starting with `c` begin mid-cluster?
///
/// Covers combining marks (harakat among them), enclosing/spacing marks,
/// variation selectors, and the zero-width joiners.
fn is_cluster_extender(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::NonspacingMark
            | GeneralCategory::SpacingMark
            | GeneralCategory::EnclosingMark
            | GeneralCategory::Format
    )
}

/// Adjust a raw byte cut position so the split respects Unicode clusters.
///
/// The returned position is a `char` boundary, and the character following
/// it is not a combining mark, variation selector, or joiner; the cut moves
/// left as far as needed (bottoming out at 0).
pub fn safe_cut_position(
    s: &str,
    pos: usize,
) -> usize {
    let mut pos = floor_char_boundary(s, pos);
    while pos > 0 && pos < s.len() {
        let c = s[pos..].chars().next().unwrap();
        if !is_cluster_extender(c) {
            break;
        }
        pos = floor_char_boundary(s, pos - 1);
    }
    pos
}

/// The byte offset after at most `chars` characters, starting at `start`.
pub fn char_budget(
    s: &str,
    start: usize,
    chars: usize,
) -> usize {
    match s[start..].char_indices().nth(chars) {
        Some((offset, _)) => start + offset,
        None => s.len(),
    }
}

/// The number of `char`s in the string.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
