//! End-to-end editor scenarios driven through the public API.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use prompt_tui::{
    word_wrap_line, CombinedAutocompleteProvider, CommandEntry, Component, Editor, EditorOptions,
    EditorTheme, Focusable, SlashCommand,
};

fn editor() -> Editor {
    Editor::new(EditorTheme::default(), EditorOptions::default())
}

fn type_str(editor: &mut Editor, text: &str) {
    for ch in text.chars() {
        let input = ch.to_string();
        editor.handle_input(&input);
    }
}

fn capture_submits(editor: &mut Editor) -> Rc<RefCell<Vec<String>>> {
    let submitted: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let submitted_ref = submitted.clone();
    editor.set_on_submit(Some(Box::new(move |text| {
        submitted_ref.borrow_mut().push(text);
    })));
    submitted
}

#[test]
fn basic_wrap_produces_two_chunks() {
    let mut editor = editor();
    editor.set_terminal_rows(30);
    type_str(&mut editor, "the quick brown fox");
    let _ = editor.render(10);

    let chunks = word_wrap_line("the quick brown fox", 10);
    let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["the quick", "brown fox"]);

    let (line, col) = editor.get_cursor();
    assert_eq!(line, 0);
    assert_eq!(col - chunks[1].start_index, 9);
}

#[test]
fn grapheme_backspace_removes_family_emoji() {
    let mut editor = editor();
    editor.handle_input("👨‍👩‍👧");
    editor.handle_input("\x7f");
    assert_eq!(editor.get_text(), "");
    assert_eq!(editor.get_cursor(), (0, 0));
}

#[test]
fn large_paste_round_trips_through_marker() {
    let mut editor = editor();
    let submitted = capture_submits(&mut editor);

    let original = (0..12)
        .map(|idx| format!("paste line {idx}"))
        .collect::<Vec<_>>()
        .join("\n");
    editor.handle_input(&format!("\x1b[200~{original}\x1b[201~"));

    assert_eq!(editor.get_text(), "[paste #1 +12 lines]");
    assert_eq!(editor.get_expanded_text(), original);

    editor.handle_input("\r");
    assert_eq!(submitted.borrow().as_slice(), &[original]);
    assert_eq!(editor.get_text(), "");
}

#[test]
fn slash_command_completion_submits_applied_command() {
    let commands = vec![
        CommandEntry::Command(SlashCommand {
            name: "help".to_string(),
            description: Some("Show help".to_string()),
            get_argument_completions: None,
        }),
        CommandEntry::Command(SlashCommand {
            name: "hello".to_string(),
            description: None,
            get_argument_completions: None,
        }),
    ];
    let provider = CombinedAutocompleteProvider::new(commands, PathBuf::from("."));

    let mut editor = editor();
    editor.set_autocomplete_provider(Box::new(provider));
    let submitted = capture_submits(&mut editor);

    type_str(&mut editor, "/he");
    assert!(editor.is_showing_autocomplete());

    editor.handle_input("\r");
    assert_eq!(submitted.borrow().as_slice(), &["/help"]);
    assert!(!editor.is_showing_autocomplete());
}

#[test]
fn csi_u_shifted_codepoint_inserts_uppercase() {
    let mut editor = editor();
    editor.handle_input("\x1b[97:65;2u");
    assert_eq!(editor.get_text(), "A");
}

#[test]
fn history_recall_round_trip() {
    let mut editor = editor();
    let submitted = capture_submits(&mut editor);

    type_str(&mut editor, "first");
    editor.handle_input("\r");
    type_str(&mut editor, "second");
    editor.handle_input("\r");

    // The host feeds accepted submissions back into history.
    let entries: Vec<String> = submitted.borrow().clone();
    for text in &entries {
        editor.add_to_history(text);
    }

    editor.handle_input("\x1b[A");
    assert_eq!(editor.get_text(), "second");
    editor.handle_input("\x1b[A");
    assert_eq!(editor.get_text(), "first");
    editor.handle_input("\x1b[B");
    assert_eq!(editor.get_text(), "second");
    editor.handle_input("\x1b[B");
    assert_eq!(editor.get_text(), "");
}

#[test]
fn focused_editor_emits_one_cursor_marker_per_frame() {
    let mut editor = editor();
    editor.set_focused(true);
    type_str(&mut editor, "hello\nworld");
    let lines = editor.render(20);
    let marker_count: usize = lines
        .iter()
        .map(|line| line.matches("\x1b_pt:c\x07").count())
        .sum();
    assert_eq!(marker_count, 1);
}

#[test]
fn at_reference_completion_inserts_file_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("main.rs"), "").expect("write");
    let provider = CombinedAutocompleteProvider::new(Vec::new(), dir.path().to_path_buf());

    let mut editor = editor();
    editor.set_autocomplete_provider(Box::new(provider));

    type_str(&mut editor, "look at @ma");
    assert!(editor.is_showing_autocomplete());
    editor.handle_input("\t");
    assert_eq!(editor.get_text(), "look at @main.rs ");
    assert!(!editor.is_showing_autocomplete());
}
