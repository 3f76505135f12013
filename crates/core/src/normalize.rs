//! Text cleaning for extracted slide text.
//!
//! Every value pulled out of the markup goes through [`clean_text`]: leftover
//! tags are stripped, whitespace runs (including newlines and non-breaking
//! spaces) collapse to a single space, and the ends are trimmed.

use regex::Regex;
use std::sync::LazyLock;

/// Regex matching anything that looks like a markup tag.
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Clean a piece of extracted text.
///
/// Empty input yields an empty string. Applying this twice gives the same
/// result as applying it once.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = TAG_REGEX.replace_all(text, "");

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean an optional piece of text; `None` yields an empty string.
pub fn clean_optional(text: Option<&str>) -> String {
    text.map(clean_text).unwrap_or_default()
}

/// Keep at most `max_chars` characters of `text`, without an ellipsis.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside
/// a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_optional(None), "");
        assert_eq!(clean_optional(Some("")), "");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(clean_text("<b>Bold</b> text"), "Bold text");
        assert_eq!(clean_text("a <span class=\"x\">b</span> c"), "a b c");
        assert_eq!(clean_text("<br/>"), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(clean_text("Hello    world"), "Hello world");
        assert_eq!(clean_text("  Hello  "), "Hello");
        assert_eq!(clean_text("Line one\n\n  Line two\r\n"), "Line one Line two");
        assert_eq!(clean_text("\t\tHello\t\t"), "Hello");
    }

    #[test]
    fn test_non_breaking_space_collapses() {
        assert_eq!(clean_text("100\u{a0}\u{a0}%"), "100 %");
    }

    #[test]
    fn test_cyrillic_text_is_kept() {
        assert_eq!(clean_text("  Анализ   рынка "), "Анализ рынка");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "",
            "   ",
            "plain",
            "<p>Hello <b>world</b></p>",
            "a <> b",
            "<<b>x>",
            "<a <b>c>",
            "x\n<i\n>y</i>\tz",
            "3 < 4 and 5 > 2",
            "Анализ\u{a0}рынка",
        ];

        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("рынок", 2), "ры");
    }

    #[test]
    fn test_truncate_250_to_200() {
        let long = "x".repeat(250);
        assert_eq!(char_len(truncate_chars(&long, 200)), 200);
    }
}
