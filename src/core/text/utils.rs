//! Shared text helpers for layout and the overlay.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::extract_escape_code;
use super::width::visible_width;

const RESET: &str = "\x1b[0m";

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

pub fn is_whitespace_char(ch: char) -> bool {
    ch.is_whitespace()
}

pub fn is_punctuation_char(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')'
            | '{'
            | '}'
            | '['
            | ']'
            | '<'
            | '>'
            | '.'
            | ','
            | ';'
            | ':'
            | '\''
            | '"'
            | '!'
            | '?'
            | '+'
            | '-'
            | '='
            | '*'
            | '/'
            | '\\'
            | '|'
            | '&'
            | '%'
            | '^'
            | '$'
            | '#'
            | '@'
            | '~'
            | '`'
    )
}

/// Truncate `text` to at most `max_width` visible cells, preserving any
/// embedded escape codes and terminating carried styling with a reset before
/// the ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::new();
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(escape) = extract_escape_code(text, idx) {
            truncated.push_str(&escape.code);
            idx += escape.length;
            continue;
        }

        let plain_end = next_escape_or_end(text, idx);
        for grapheme in grapheme_segments(&text[idx..plain_end]) {
            let width = visible_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = plain_end;
    }

    let mut result = String::with_capacity(truncated.len() + RESET.len() + ellipsis.len());
    result.push_str(&truncated);
    result.push_str(RESET);
    result.push_str(ellipsis);

    if pad {
        let result_width = visible_width(&result);
        if result_width < max_width {
            result.push_str(&" ".repeat(max_width - result_width));
        }
    }

    result
}

fn next_escape_or_end(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        if extract_escape_code(input, idx).is_some() {
            break;
        }
        let ch = input[idx..].chars().next().expect("missing char");
        idx += ch.len_utf8();
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::{grapheme_segments, is_punctuation_char, is_whitespace_char, truncate_to_width};
    use crate::core::text::width::visible_width;

    #[test]
    fn truncate_returns_original_when_it_fits() {
        assert_eq!(truncate_to_width("hello", 6, "...", false), "hello");
    }

    #[test]
    fn truncate_adds_ellipsis_and_reset() {
        let truncated = truncate_to_width("hello", 4, "...", false);
        assert_eq!(truncated, "h\x1b[0m...");
        assert_eq!(visible_width(&truncated), 4);
    }

    #[test]
    fn truncate_keeps_styling_prefix() {
        let truncated = truncate_to_width("\x1b[31mhello", 4, "...", false);
        assert_eq!(truncated, "\x1b[31mh\x1b[0m...");
        assert_eq!(visible_width(&truncated), 4);
    }

    #[test]
    fn truncate_does_not_split_wide_grapheme() {
        let truncated = truncate_to_width("\x1b[31m😀a", 2, ".", false);
        assert_eq!(truncated, "\x1b[31m\x1b[0m.");
        assert_eq!(visible_width(&truncated), 1);
    }

    #[test]
    fn truncate_pads_when_requested() {
        let padded = truncate_to_width("hi", 4, "...", true);
        assert_eq!(padded, "hi  ");
    }

    #[test]
    fn char_classes() {
        assert!(is_whitespace_char(' '));
        assert!(is_whitespace_char('\t'));
        assert!(!is_whitespace_char('a'));
        assert!(is_punctuation_char('.'));
        assert!(is_punctuation_char('@'));
        assert!(!is_punctuation_char('_'));
    }

    #[test]
    fn grapheme_segments_keeps_clusters_whole() {
        let clusters: Vec<&str> = grapheme_segments("a🇺🇸b").collect();
        assert_eq!(clusters, vec!["a", "🇺🇸", "b"]);
    }
}
