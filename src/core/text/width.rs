//! Grapheme and visible width helpers.
//!
//! Columns are computed per grapheme cluster: East-Asian wide characters
//! count 2, zero-width characters count 0, and combining marks fold into
//! their base grapheme. RGI emoji sequences render 2 cells wide in every
//! terminal we target even where `unicode-width` disagrees, so they are
//! special-cased through the `emojis` crate.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::extract_escape_code;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    let mut width = 0;
    for ch in grapheme.chars() {
        if ch == '\t' {
            width += TAB_WIDTH;
            continue;
        }
        width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }
    width
}

/// Terminal columns `input` occupies, ignoring embedded escape sequences.
pub fn visible_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }

    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(escape) = extract_escape_code(input, idx) {
            idx += escape.length;
            continue;
        }

        let ch = input[idx..].chars().next().expect("missing char");
        if ch == '\t' {
            clean.push_str("   ");
        } else {
            clean.push(ch);
        }
        idx += ch.len_utf8();
    }

    let mut width = 0;
    for grapheme in clean.graphemes(true) {
        width += grapheme_width(grapheme);
    }
    width
}

#[cfg(test)]
mod tests {
    use super::{grapheme_width, visible_width};

    #[test]
    fn styling_ignored_in_width() {
        assert_eq!(visible_width("hi\x1b[31m!!\x1b[0m"), 4);
    }

    #[test]
    fn cursor_marker_ignored_in_width() {
        assert_eq!(visible_width("ab\x1b_pt:c\x07cd"), 4);
    }

    #[test]
    fn rgi_emoji_is_two_cells() {
        assert_eq!(visible_width("😀"), 2);
    }

    #[test]
    fn zwj_family_is_one_grapheme_two_cells() {
        assert_eq!(visible_width("👨‍👩‍👧"), 2);
    }

    #[test]
    fn combining_mark_folds_into_base() {
        // e + COMBINING ACUTE ACCENT
        assert_eq!(grapheme_width("e\u{0301}"), 1);
    }

    #[test]
    fn east_asian_wide() {
        assert_eq!(visible_width("漢字"), 4);
    }
}
