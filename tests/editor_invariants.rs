//! Property-style checks over input sequences.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

use prompt_tui::{visible_width, Component, Editor, EditorOptions, EditorTheme};

fn editor() -> Editor {
    Editor::new(EditorTheme::default(), EditorOptions::default())
}

fn assert_cursor_valid(editor: &Editor) {
    let lines = editor.get_lines();
    let (line, col) = editor.get_cursor();
    assert!(!lines.is_empty());
    assert!(line < lines.len(), "cursor line {line} of {}", lines.len());
    let current = &lines[line];
    assert!(col <= current.len(), "cursor col {col} in {current:?}");
    let boundaries: HashSet<usize> = current
        .grapheme_indices(true)
        .map(|(idx, _)| idx)
        .chain([current.len()])
        .collect();
    assert!(
        boundaries.contains(&col),
        "col {col} not a grapheme boundary in {current:?}"
    );
    for logical in &lines {
        assert!(!logical.contains('\n'));
    }
}

#[test]
fn cursor_stays_valid_across_arbitrary_input() {
    let events = [
        "h", "é", "漢", "👨‍👩‍👧", "\x1b[D", "\x1b[D", "x", "\r\u{0}", "\n", "up",
        "\x1b[A", "\x1b[B", "\x1b[C", "\x7f", "\x1b[3~", "\x17", "\x0b", "\x15", "\x1b[H",
        "\x1b[F", "\x1b[5~", "\x1b[6~", "\x1b[200~multi\nline paste\x1b[201~", "\x1b[97:65;2u",
        "\x1b[999X", "\x1b", " ", "tail",
    ];
    let mut editor = editor();
    editor.set_terminal_rows(12);
    for event in events {
        editor.handle_input(event);
        assert_cursor_valid(&editor);
    }
}

#[test]
fn render_width_is_exact_for_all_widths() {
    let mut editor = editor();
    editor.set_terminal_rows(14);
    editor.set_text("père Noël 🎅 said 漢字テスト and wrapped across many columns\nsecond line");
    for width in 1..=45usize {
        for line in editor.render(width) {
            assert_eq!(
                visible_width(&line),
                width,
                "render({width}) produced {line:?}"
            );
        }
    }
}

#[test]
fn set_text_round_trips_with_normalized_newlines() {
    let mut editor = editor();
    for input in ["plain", "a\r\nb", "a\rb\nc", "", "trailing\n"] {
        editor.set_text(input);
        let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
        assert_eq!(editor.get_text(), normalized);
        assert_cursor_valid(&editor);
    }
}

#[test]
fn paste_then_submit_is_trim_of_normalized_input() {
    let long_line = "x".repeat(1500);
    let many_lines = (0..25)
        .map(|idx| format!("row {idx}"))
        .collect::<Vec<_>>()
        .join("\n");
    for original in ["short", "  padded  ", long_line.as_str(), many_lines.as_str()] {
        let mut editor = editor();
        let submitted = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let submitted_ref = submitted.clone();
        editor.set_on_submit(Some(Box::new(move |text: String| {
            submitted_ref.borrow_mut().push(text);
        })));

        editor.handle_input(&format!("\x1b[200~{original}\x1b[201~"));
        editor.handle_input("\r");

        let expected = original
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .trim()
            .to_string();
        assert_eq!(submitted.borrow().as_slice(), &[expected]);
    }
}

#[test]
fn history_is_bounded_and_deduplicated() {
    let mut editor = editor();
    for idx in 0..150 {
        editor.add_to_history(&format!("entry {idx}"));
        editor.add_to_history(&format!("entry {idx}"));
        editor.add_to_history("   ");
    }

    // Walk as far back as the editor allows; the cap keeps the hundred most
    // recent entries, so the walk bottoms out at entry 50.
    for _ in 0..200 {
        editor.handle_input("\x1b[A");
    }
    assert_eq!(editor.get_text(), "entry 50");
}

#[test]
fn vertical_round_trip_preserves_visual_column_across_chunks() {
    let mut editor = editor();
    editor.set_terminal_rows(30);
    editor.set_text("alpha beta gamma delta epsilon zeta eta theta");
    let _ = editor.render(16);

    // Move into the middle of a wrapped chunk, then up and back down.
    for _ in 0..3 {
        editor.handle_input("\x1b[D");
    }
    let start = editor.get_cursor();
    editor.handle_input("\x1b[A");
    assert_ne!(editor.get_cursor(), start);
    editor.handle_input("\x1b[B");
    assert_eq!(editor.get_cursor(), start);
}

#[test]
fn wrap_chunks_partition_every_line() {
    for line in [
        "the quick brown fox jumps over the lazy dog",
        "word",
        "   leading and   double  spaces ",
        "unbroken-super-long-token-that-exceeds-any-width",
        "漢字が複数の行に折り返されるテキスト",
    ] {
        for width in 1..=20usize {
            let chunks = prompt_tui::word_wrap_line(line, width);
            assert!(!chunks.is_empty());
            assert_eq!(chunks[0].start_index, 0);
            assert_eq!(chunks.last().unwrap().end_index, line.len());
            for pair in chunks.windows(2) {
                assert_eq!(pair[0].end_index, pair[1].start_index);
            }
            for chunk in &chunks {
                let span = &line[chunk.start_index..chunk.end_index];
                assert_eq!(
                    span.trim_end(),
                    chunk.text.trim_end(),
                    "chunk display must be the span minus trailing whitespace"
                );
            }
        }
    }
}
