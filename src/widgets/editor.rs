//! Multi-line editor widget.
//!
//! The interactive prompt of the TUI: a logical line buffer with a
//! grapheme-aware cursor, word-wrap layout, bracketed-paste capture with
//! out-of-line storage for large pastes, submit history, and an autocomplete
//! overlay driven by an [`AutocompleteProvider`].

use std::cmp::{max, min};
use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::core::autocomplete::{AutocompleteItem, AutocompleteProvider};
use crate::core::component::{Component, Focusable};
use crate::core::cursor::CURSOR_MARKER;
use crate::core::editor_component::EditorComponent;
use crate::core::keybindings::{get_editor_keybindings, EditorAction};
use crate::core::text::utils::{
    grapheme_segments, is_punctuation_char, is_whitespace_char, truncate_to_width,
};
use crate::core::text::width::visible_width;
use crate::logging::DebugLogger;
use crate::widgets::select_list::{SelectItem, SelectList, SelectListTheme};

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

const MAX_PASTE_LINES: usize = 10;
const MAX_PASTE_CHARS: usize = 1000;
const HISTORY_LIMIT: usize = 100;

/// A slice of a logical line produced by word wrap.
///
/// `start_index..end_index` covers the chunk's bytes in the original line,
/// including any trailing whitespace trimmed from `text`, so cursor
/// positions round-trip between logical and visual coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
}

fn is_whitespace_segment(segment: &str) -> bool {
    segment.chars().any(is_whitespace_char)
}

fn is_punctuation_segment(segment: &str) -> bool {
    segment.chars().any(is_punctuation_char)
}

/// Split a line into word-wrapped chunks of at most `max_width` cells.
///
/// Wraps at whitespace boundaries where possible; a single token wider than
/// `max_width` is broken by grapheme. Whitespace at a wrap boundary is
/// trimmed from the closing chunk's display text and discarded from the
/// start of the next, but stays inside the closing chunk's byte span.
pub fn word_wrap_line(line: &str, max_width: usize) -> Vec<TextChunk> {
    if line.is_empty() || max_width == 0 {
        return vec![TextChunk {
            text: String::new(),
            start_index: 0,
            end_index: 0,
        }];
    }

    let line_width = visible_width(line);
    if line_width <= max_width {
        return vec![TextChunk {
            text: line.to_string(),
            start_index: 0,
            end_index: line.len(),
        }];
    }

    let mut chunks: Vec<TextChunk> = Vec::new();
    let segments: Vec<(usize, &str)> = line.grapheme_indices(true).collect();

    let mut current_width = 0usize;
    let mut chunk_start = 0usize;
    let mut wrap_opp_index: Option<usize> = None;
    let mut wrap_opp_width = 0usize;

    for (idx, (char_index, grapheme)) in segments.iter().enumerate() {
        let g_width = visible_width(grapheme);
        let is_ws = is_whitespace_segment(grapheme);

        if current_width + g_width > max_width {
            if let Some(opp) = wrap_opp_index {
                chunks.push(make_chunk(line, chunk_start, opp));
                chunk_start = opp;
                current_width = current_width.saturating_sub(wrap_opp_width);
            } else if chunk_start < *char_index {
                chunks.push(make_chunk(line, chunk_start, *char_index));
                chunk_start = *char_index;
                current_width = 0;
            }
            wrap_opp_index = None;
        }

        if is_ws && !chunks.is_empty() && chunk_start == *char_index {
            // Leading whitespace on a wrapped line: fold it into the span of
            // the previous chunk and keep the new chunk starting at content.
            chunk_start = char_index + grapheme.len();
            if let Some(last) = chunks.last_mut() {
                last.end_index = chunk_start;
            }
            wrap_opp_index = None;
            continue;
        }

        current_width = current_width.saturating_add(g_width);

        if is_ws {
            if let Some((next_index, next_segment)) = segments.get(idx + 1) {
                if !is_whitespace_segment(next_segment) {
                    wrap_opp_index = Some(*next_index);
                    wrap_opp_width = current_width;
                }
            }
        }
    }

    chunks.push(TextChunk {
        text: line[chunk_start..].to_string(),
        start_index: chunk_start,
        end_index: line.len(),
    });

    chunks
}

fn make_chunk(line: &str, start: usize, end: usize) -> TextChunk {
    TextChunk {
        text: line[start..end].trim_end().to_string(),
        start_index: start,
        end_index: end,
    }
}

#[derive(Debug, Clone)]
struct EditorState {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
}

#[derive(Debug, Clone)]
struct LayoutLine {
    text: String,
    has_cursor: bool,
    cursor_pos: Option<usize>,
}

#[derive(Debug, Clone)]
struct VisualLine {
    logical_line: usize,
    start_col: usize,
    length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Rounded,
    Sharp,
    None,
}

impl BorderStyle {
    fn corners(self) -> Option<(char, char, char, char)> {
        match self {
            BorderStyle::Rounded => Some(('╭', '╮', '╰', '╯')),
            BorderStyle::Sharp => Some(('┌', '┐', '└', '┘')),
            BorderStyle::None => None,
        }
    }
}

pub struct EditorTheme {
    pub border_color: Box<dyn Fn(&str) -> String>,
    pub select_list: SelectListTheme,
}

impl Default for EditorTheme {
    fn default() -> Self {
        Self {
            border_color: Box::new(|text| text.to_string()),
            select_list: SelectListTheme::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EditorOptions {
    pub padding_x: Option<usize>,
    pub border_style: Option<BorderStyle>,
    pub autocomplete_max_visible: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutocompleteKind {
    SlashCommand,
    FileReference,
    ForcedFile,
}

/// Active-overlay bookkeeping; the list widget itself lives on the editor.
struct AutocompleteContext {
    prefix: String,
    kind: AutocompleteKind,
}

pub struct Editor {
    state: EditorState,
    focused: bool,
    padding_x: usize,
    border_style: BorderStyle,
    autocomplete_max_visible: usize,
    last_width: usize,
    scroll_offset: usize,
    border_color: Box<dyn Fn(&str) -> String>,
    terminal_rows: usize,
    preferred_visual_col: Option<usize>,
    pending_backslash: bool,
    disable_submit: bool,
    pastes: HashMap<u32, String>,
    paste_counter: u32,
    paste_buffer: String,
    is_in_paste: bool,
    provider: Option<Box<dyn AutocompleteProvider>>,
    select_list: SelectList,
    autocomplete: Option<AutocompleteContext>,
    on_submit: Option<Box<dyn FnMut(String)>>,
    on_change: Option<Box<dyn FnMut(String)>>,
    history: Vec<String>,
    history_index: isize,
    debug: DebugLogger,
}

impl Editor {
    pub fn new(theme: EditorTheme, options: EditorOptions) -> Self {
        let padding_x = options.padding_x.unwrap_or(0);
        let border_style = options.border_style.unwrap_or_default();
        let max_visible = options.autocomplete_max_visible.unwrap_or(5);
        let autocomplete_max_visible = max(3, min(20, max_visible));
        Self {
            state: EditorState {
                lines: vec![String::new()],
                cursor_line: 0,
                cursor_col: 0,
            },
            focused: false,
            padding_x,
            border_style,
            autocomplete_max_visible,
            last_width: 80,
            scroll_offset: 0,
            border_color: theme.border_color,
            terminal_rows: 0,
            preferred_visual_col: None,
            pending_backslash: false,
            disable_submit: false,
            pastes: HashMap::new(),
            paste_counter: 0,
            paste_buffer: String::new(),
            is_in_paste: false,
            provider: None,
            select_list: SelectList::new(Vec::new(), autocomplete_max_visible, theme.select_list),
            autocomplete: None,
            on_submit: None,
            on_change: None,
            history: Vec::new(),
            history_index: -1,
            debug: DebugLogger::from_env(),
        }
    }

    pub fn set_terminal_rows(&mut self, rows: usize) {
        self.terminal_rows = rows;
    }

    pub fn get_lines(&self) -> Vec<String> {
        self.state.lines.clone()
    }

    pub fn get_text(&self) -> String {
        self.state.lines.join("\n")
    }

    pub fn get_expanded_text(&self) -> String {
        let text = self.get_text();
        self.replace_paste_markers(&text)
    }

    pub fn get_cursor(&self) -> (usize, usize) {
        (self.state.cursor_line, self.state.cursor_col)
    }

    pub fn set_text(&mut self, text: &str) {
        self.history_index = -1;
        self.set_text_internal(text);
        self.sync_autocomplete();
    }

    pub fn insert_text_at_cursor(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.history_index = -1;
        self.insert_text_at_cursor_internal(text);
        self.sync_autocomplete();
    }

    pub fn set_padding_x(&mut self, padding: usize) {
        self.padding_x = padding;
    }

    pub fn set_border_style(&mut self, style: BorderStyle) {
        self.border_style = style;
    }

    pub fn set_autocomplete_max_visible(&mut self, max_visible: usize) {
        self.autocomplete_max_visible = max(3, min(20, max_visible));
        self.select_list
            .set_max_visible(self.autocomplete_max_visible);
    }

    pub fn set_border_color(&mut self, border_color: Box<dyn Fn(&str) -> String>) {
        self.border_color = border_color;
    }

    pub fn set_on_submit(&mut self, handler: Option<Box<dyn FnMut(String)>>) {
        self.on_submit = handler;
    }

    pub fn set_on_change(&mut self, handler: Option<Box<dyn FnMut(String)>>) {
        self.on_change = handler;
    }

    pub fn set_disable_submit(&mut self, disabled: bool) {
        self.disable_submit = disabled;
    }

    pub fn set_autocomplete_provider(&mut self, provider: Box<dyn AutocompleteProvider>) {
        self.provider = Some(provider);
    }

    pub fn is_showing_autocomplete(&self) -> bool {
        self.autocomplete.is_some()
    }

    pub fn add_to_history(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        if self
            .history
            .first()
            .map(|item| item == trimmed)
            .unwrap_or(false)
        {
            return;
        }
        self.history.insert(0, trimmed.to_string());
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop();
        }
    }

    fn emit_change(&mut self) {
        if self.on_change.is_some() {
            let text = self.get_text();
            if let Some(handler) = self.on_change.as_mut() {
                handler(text);
            }
        }
    }

    fn clamp_cursor(&mut self) {
        if self.state.lines.is_empty() {
            self.state.lines.push(String::new());
            self.state.cursor_line = 0;
            self.state.cursor_col = 0;
            return;
        }
        if self.state.cursor_line >= self.state.lines.len() {
            self.state.cursor_line = self.state.lines.len().saturating_sub(1);
        }
        let line_len = self
            .state
            .lines
            .get(self.state.cursor_line)
            .map(|line| line.len())
            .unwrap_or(0);
        if self.state.cursor_col > line_len {
            self.state.cursor_col = line_len;
        }
        if let Some(line) = self.state.lines.get(self.state.cursor_line) {
            while self.state.cursor_col > 0 && !line.is_char_boundary(self.state.cursor_col) {
                self.state.cursor_col = self.state.cursor_col.saturating_sub(1);
            }
        }
    }

    fn insert_text_at_cursor_internal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let inserted_lines: Vec<&str> = normalized.split('\n').collect();

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();
        let before_cursor = &current_line[..self.state.cursor_col];
        let after_cursor = &current_line[self.state.cursor_col..];

        if inserted_lines.len() == 1 {
            self.state.lines[self.state.cursor_line] =
                format!("{before_cursor}{normalized}{after_cursor}");
            self.set_cursor_col(self.state.cursor_col + normalized.len());
        } else {
            let mut next_lines = Vec::new();
            next_lines.extend_from_slice(&self.state.lines[..self.state.cursor_line]);
            next_lines.push(format!("{before_cursor}{}", inserted_lines[0]));

            if inserted_lines.len() > 2 {
                for mid in &inserted_lines[1..inserted_lines.len() - 1] {
                    next_lines.push((*mid).to_string());
                }
            }

            let last_inserted = inserted_lines.last().copied().unwrap_or("");
            next_lines.push(format!("{last_inserted}{after_cursor}"));
            next_lines.extend_from_slice(&self.state.lines[self.state.cursor_line + 1..]);

            self.state.lines = next_lines;
            self.state.cursor_line = self
                .state
                .cursor_line
                .saturating_add(inserted_lines.len() - 1);
            self.set_cursor_col(last_inserted.len());
        }

        self.emit_change();
    }

    fn insert_character(&mut self, ch: &str) {
        if ch.is_empty() {
            return;
        }

        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();
        let before = &current_line[..self.state.cursor_col];
        let after = &current_line[self.state.cursor_col..];
        self.state.lines[self.state.cursor_line] = format!("{before}{ch}{after}");
        self.set_cursor_col(self.state.cursor_col + ch.len());

        self.emit_change();

        if self.autocomplete.is_some() {
            self.refresh_autocomplete();
        } else {
            self.maybe_activate_after_insert(ch);
        }
    }

    fn handle_paste(&mut self, pasted_text: &str) {
        self.history_index = -1;

        let cleaned = pasted_text.replace("\r\n", "\n").replace('\r', "\n");
        let tab_expanded = cleaned.replace('\t', "    ");
        let mut filtered: String = tab_expanded
            .chars()
            .filter(|ch| *ch == '\n' || (*ch as u32) >= 32)
            .collect();

        // Pasting a path right after a word would glue them together.
        if filtered.starts_with('/') || filtered.starts_with('~') || filtered.starts_with('.') {
            let current_line = self
                .state
                .lines
                .get(self.state.cursor_line)
                .map(String::as_str)
                .unwrap_or("");
            let char_before = if self.state.cursor_col > 0 {
                current_line[..self.state.cursor_col].chars().last()
            } else {
                None
            };
            if let Some(ch) = char_before {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    filtered = format!(" {filtered}");
                }
            }
        }

        let pasted_lines_count = filtered.split('\n').count();
        let total_chars = filtered.chars().count();

        if pasted_lines_count > MAX_PASTE_LINES || total_chars > MAX_PASTE_CHARS {
            self.paste_counter = self.paste_counter.saturating_add(1);
            let paste_id = self.paste_counter;
            self.pastes.insert(paste_id, filtered);

            let marker = if pasted_lines_count > MAX_PASTE_LINES {
                format!("[paste #{paste_id} +{pasted_lines_count} lines]")
            } else {
                format!("[paste #{paste_id} {total_chars} chars]")
            };
            self.insert_text_at_cursor_internal(&marker);
        } else {
            self.insert_text_at_cursor_internal(&filtered);
        }

        self.sync_autocomplete();
    }

    fn add_new_line(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();
        let before = current_line[..self.state.cursor_col].to_string();
        let after = current_line[self.state.cursor_col..].to_string();

        self.state.lines[self.state.cursor_line] = before;
        self.state.lines.insert(self.state.cursor_line + 1, after);
        self.state.cursor_line += 1;
        self.set_cursor_col(0);

        self.emit_change();
        self.sync_autocomplete();
    }

    fn submit_value(&mut self) {
        let joined = self.get_text();
        let expanded = self.replace_paste_markers(&joined);
        let result = expanded.trim().to_string();

        if self.debug.is_enabled() {
            self.debug.log(&format!("submit: {} bytes", result.len()));
        }

        self.state = EditorState {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
        };
        self.pastes.clear();
        self.paste_counter = 0;
        self.history_index = -1;
        self.scroll_offset = 0;
        self.autocomplete = None;
        self.pending_backslash = false;
        self.preferred_visual_col = None;

        self.emit_change();
        if let Some(handler) = self.on_submit.as_mut() {
            handler(result);
        }
    }

    fn handle_backspace(&mut self) {
        self.history_index = -1;

        if self.state.cursor_col > 0 {
            let line = self
                .state
                .lines
                .get(self.state.cursor_line)
                .cloned()
                .unwrap_or_default();
            let before_cursor = &line[..self.state.cursor_col];
            let mut graphemes: Vec<&str> = grapheme_segments(before_cursor).collect();
            let grapheme_len = graphemes.pop().map(|seg| seg.len()).unwrap_or(1);
            let start = self.state.cursor_col.saturating_sub(grapheme_len);
            let after = &line[self.state.cursor_col..];
            self.state.lines[self.state.cursor_line] = format!("{}{}", &line[..start], after);
            self.set_cursor_col(start);
        } else if self.state.cursor_line > 0 {
            // Joining lines keeps any trailing whitespace on the previous
            // line, which can leave a double space at the seam.
            let current = self
                .state
                .lines
                .get(self.state.cursor_line)
                .cloned()
                .unwrap_or_default();
            let prev_index = self.state.cursor_line - 1;
            let previous = self
                .state
                .lines
                .get(prev_index)
                .cloned()
                .unwrap_or_default();
            self.state.lines[prev_index] = format!("{previous}{current}");
            self.state.lines.remove(self.state.cursor_line);
            self.state.cursor_line = prev_index;
            self.set_cursor_col(previous.len());
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn handle_forward_delete(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();

        if self.state.cursor_col < current_line.len() {
            let after_cursor = &current_line[self.state.cursor_col..];
            let mut graphemes = grapheme_segments(after_cursor);
            let first = graphemes.next().unwrap_or("");
            let end = self.state.cursor_col.saturating_add(first.len());
            self.state.lines[self.state.cursor_line] = format!(
                "{}{}",
                &current_line[..self.state.cursor_col],
                &current_line[end..]
            );
        } else if self.state.cursor_line + 1 < self.state.lines.len() {
            let next_line = self
                .state
                .lines
                .get(self.state.cursor_line + 1)
                .cloned()
                .unwrap_or_default();
            self.state.lines[self.state.cursor_line] = format!("{current_line}{next_line}");
            self.state.lines.remove(self.state.cursor_line + 1);
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn delete_to_start_of_line(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();

        if self.state.cursor_col > 0 {
            self.state.lines[self.state.cursor_line] =
                current_line[self.state.cursor_col..].to_string();
            self.set_cursor_col(0);
        } else if self.state.cursor_line > 0 {
            let prev_index = self.state.cursor_line - 1;
            let previous = self
                .state
                .lines
                .get(prev_index)
                .cloned()
                .unwrap_or_default();
            self.state.lines[prev_index] = format!("{previous}{current_line}");
            self.state.lines.remove(self.state.cursor_line);
            self.state.cursor_line = prev_index;
            self.set_cursor_col(previous.len());
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn delete_to_end_of_line(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();

        if self.state.cursor_col < current_line.len() {
            self.state.lines[self.state.cursor_line] =
                current_line[..self.state.cursor_col].to_string();
        } else if self.state.cursor_line + 1 < self.state.lines.len() {
            let next_line = self
                .state
                .lines
                .get(self.state.cursor_line + 1)
                .cloned()
                .unwrap_or_default();
            self.state.lines[self.state.cursor_line] = format!("{current_line}{next_line}");
            self.state.lines.remove(self.state.cursor_line + 1);
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn delete_word_backwards(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();

        if self.state.cursor_col == 0 {
            if self.state.cursor_line > 0 {
                let prev_index = self.state.cursor_line - 1;
                let previous = self
                    .state
                    .lines
                    .get(prev_index)
                    .cloned()
                    .unwrap_or_default();
                self.state.lines[prev_index] = format!("{previous}{current_line}");
                self.state.lines.remove(self.state.cursor_line);
                self.state.cursor_line = prev_index;
                self.set_cursor_col(previous.len());
            }
        } else {
            let old_col = self.state.cursor_col;
            self.move_word_backwards();
            let delete_from = self.state.cursor_col;
            self.state.lines[self.state.cursor_line] = format!(
                "{}{}",
                &current_line[..delete_from],
                &current_line[old_col..]
            );
            self.set_cursor_col(delete_from);
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn delete_word_forwards(&mut self) {
        self.history_index = -1;

        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .cloned()
            .unwrap_or_default();

        if self.state.cursor_col >= current_line.len() {
            if self.state.cursor_line + 1 < self.state.lines.len() {
                let next_line = self
                    .state
                    .lines
                    .get(self.state.cursor_line + 1)
                    .cloned()
                    .unwrap_or_default();
                self.state.lines[self.state.cursor_line] = format!("{current_line}{next_line}");
                self.state.lines.remove(self.state.cursor_line + 1);
            }
        } else {
            let old_col = self.state.cursor_col;
            self.move_word_forwards();
            let delete_to = self.state.cursor_col;
            self.set_cursor_col(old_col);
            self.state.lines[self.state.cursor_line] = format!(
                "{}{}",
                &current_line[..old_col],
                &current_line[delete_to..]
            );
        }

        self.emit_change();
        self.sync_autocomplete();
    }

    fn replace_paste_markers(&self, input: &str) -> String {
        const MARKER_OPEN: &str = "[paste #";

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(open) = rest.find(MARKER_OPEN) {
            let (head, tail) = rest.split_at(open);
            out.push_str(head);

            let body = &tail[MARKER_OPEN.len()..];
            let digits = body.bytes().take_while(|b| b.is_ascii_digit()).count();
            let id = body[..digits].parse::<u32>().ok();
            let close = body[digits..].find(']');

            let (Some(id), Some(close)) = (id, close) else {
                // Not a well-formed marker; keep the opener literally and
                // rescan right after it.
                out.push_str(MARKER_OPEN);
                rest = body;
                continue;
            };

            let marker_len = MARKER_OPEN.len() + digits + close + 1;
            match self.pastes.get(&id) {
                Some(content) => out.push_str(content),
                // Table cleared out from under us; keep the literal marker
                // rather than dropping user text.
                None => out.push_str(&tail[..marker_len]),
            }
            rest = &tail[marker_len..];
        }
        out.push_str(rest);
        out
    }

    fn layout_text(&self, content_width: usize) -> Vec<LayoutLine> {
        let mut layout_lines = Vec::new();

        if self.state.lines.is_empty()
            || (self.state.lines.len() == 1 && self.state.lines[0].is_empty())
        {
            layout_lines.push(LayoutLine {
                text: String::new(),
                has_cursor: true,
                cursor_pos: Some(0),
            });
            return layout_lines;
        }

        for (line_idx, line) in self.state.lines.iter().enumerate() {
            let is_current = line_idx == self.state.cursor_line;
            let chunks = word_wrap_line(line, content_width);
            let chunk_count = chunks.len();

            for (chunk_index, chunk) in chunks.into_iter().enumerate() {
                let is_last_chunk = chunk_index + 1 == chunk_count;
                let mut has_cursor = false;
                let mut adjusted_cursor = 0usize;

                if is_current {
                    if is_last_chunk {
                        has_cursor = self.state.cursor_col >= chunk.start_index;
                        adjusted_cursor =
                            self.state.cursor_col.saturating_sub(chunk.start_index);
                    } else if self.state.cursor_col >= chunk.start_index
                        && self.state.cursor_col < chunk.end_index
                    {
                        has_cursor = true;
                        adjusted_cursor =
                            self.state.cursor_col.saturating_sub(chunk.start_index);
                    }
                    if adjusted_cursor > chunk.text.len() {
                        // Cursor inside whitespace trimmed at the wrap point.
                        adjusted_cursor = chunk.text.len();
                    }
                }

                layout_lines.push(LayoutLine {
                    text: chunk.text,
                    has_cursor,
                    cursor_pos: if has_cursor { Some(adjusted_cursor) } else { None },
                });
            }
        }

        layout_lines
    }

    fn build_visual_line_map(&self, width: usize) -> Vec<VisualLine> {
        let mut visual_lines = Vec::new();

        for (idx, line) in self.state.lines.iter().enumerate() {
            for chunk in word_wrap_line(line, width) {
                visual_lines.push(VisualLine {
                    logical_line: idx,
                    start_col: chunk.start_index,
                    length: chunk.end_index.saturating_sub(chunk.start_index),
                });
            }
        }

        visual_lines
    }

    fn find_current_visual_line(&self, visual_lines: &[VisualLine]) -> usize {
        for (idx, line) in visual_lines.iter().enumerate() {
            if line.logical_line == self.state.cursor_line {
                let col_in_segment = self.state.cursor_col.saturating_sub(line.start_col);
                let is_last_segment = idx + 1 == visual_lines.len()
                    || visual_lines[idx + 1].logical_line != line.logical_line;
                if col_in_segment < line.length || (is_last_segment && col_in_segment <= line.length)
                {
                    return idx;
                }
            }
        }
        visual_lines.len().saturating_sub(1)
    }

    fn move_cursor(&mut self, delta_line: isize, delta_col: isize) {
        let visual_lines = self.build_visual_line_map(self.last_width);
        let current_visual_line = self.find_current_visual_line(&visual_lines);

        if delta_line != 0 {
            let delta = delta_line.unsigned_abs();
            let target_visual = if delta_line.is_negative() {
                current_visual_line.saturating_sub(delta)
            } else {
                min(
                    visual_lines.len().saturating_sub(1),
                    current_visual_line.saturating_add(delta),
                )
            };
            if target_visual < visual_lines.len() {
                self.move_to_visual_line(&visual_lines, current_visual_line, target_visual);
            }
        }

        if delta_col != 0 {
            let current_line = self
                .state
                .lines
                .get(self.state.cursor_line)
                .map(String::as_str)
                .unwrap_or("");

            if delta_col > 0 {
                if self.state.cursor_col < current_line.len() {
                    let after_cursor = &current_line[self.state.cursor_col..];
                    let mut graphemes = grapheme_segments(after_cursor);
                    if let Some(first) = graphemes.next() {
                        self.set_cursor_col(self.state.cursor_col + first.len());
                    } else {
                        self.set_cursor_col(self.state.cursor_col + 1);
                    }
                } else if self.state.cursor_line + 1 < self.state.lines.len() {
                    self.state.cursor_line += 1;
                    self.set_cursor_col(0);
                }
            } else if self.state.cursor_col > 0 {
                let before_cursor = &current_line[..self.state.cursor_col];
                let mut graphemes: Vec<&str> = grapheme_segments(before_cursor).collect();
                if let Some(last) = graphemes.pop() {
                    self.set_cursor_col(self.state.cursor_col.saturating_sub(last.len()));
                } else {
                    self.set_cursor_col(self.state.cursor_col.saturating_sub(1));
                }
            } else if self.state.cursor_line > 0 {
                self.state.cursor_line = self.state.cursor_line.saturating_sub(1);
                let prev_line = self.state.lines[self.state.cursor_line].as_str();
                self.set_cursor_col(prev_line.len());
            }
        }
    }

    fn move_to_visual_line(
        &mut self,
        visual_lines: &[VisualLine],
        current_visual_line: usize,
        target_visual_line: usize,
    ) {
        let Some(current_vl) = visual_lines.get(current_visual_line) else {
            return;
        };
        let Some(target_vl) = visual_lines.get(target_visual_line) else {
            return;
        };

        let current_visual_col = self.state.cursor_col.saturating_sub(current_vl.start_col);

        let is_last_source = current_visual_line + 1 >= visual_lines.len()
            || visual_lines[current_visual_line + 1].logical_line != current_vl.logical_line;
        let source_max = if is_last_source {
            current_vl.length
        } else {
            current_vl.length.saturating_sub(1)
        };

        let is_last_target = target_visual_line + 1 >= visual_lines.len()
            || visual_lines[target_visual_line + 1].logical_line != target_vl.logical_line;
        let target_max = if is_last_target {
            target_vl.length
        } else {
            target_vl.length.saturating_sub(1)
        };

        let move_col = self.compute_vertical_move_column(current_visual_col, source_max, target_max);
        self.state.cursor_line = target_vl.logical_line;
        let target_col = target_vl.start_col.saturating_add(move_col);
        let line_len = self
            .state
            .lines
            .get(self.state.cursor_line)
            .map(|line| line.len())
            .unwrap_or(0);
        self.state.cursor_col = min(target_col, line_len);
    }

    fn compute_vertical_move_column(
        &mut self,
        current_visual_col: usize,
        source_max: usize,
        target_max: usize,
    ) -> usize {
        let has_preferred = self.preferred_visual_col.is_some();
        let cursor_in_middle = current_visual_col < source_max;
        let target_too_short = target_max < current_visual_col;

        if !has_preferred || cursor_in_middle {
            if target_too_short {
                self.preferred_visual_col = Some(current_visual_col);
                return target_max;
            }
            self.preferred_visual_col = None;
            return current_visual_col;
        }

        let preferred = self.preferred_visual_col.unwrap_or(0);
        let target_cant_fit = target_max < preferred;
        if target_too_short || target_cant_fit {
            return target_max;
        }

        self.preferred_visual_col = None;
        preferred
    }

    fn move_to_line_start(&mut self) {
        self.set_cursor_col(0);
    }

    fn move_to_line_end(&mut self) {
        if let Some(line) = self.state.lines.get(self.state.cursor_line) {
            self.set_cursor_col(line.len());
        } else {
            self.set_cursor_col(0);
        }
    }

    fn move_word_backwards(&mut self) {
        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .map(String::as_str)
            .unwrap_or("");

        if self.state.cursor_col == 0 {
            if self.state.cursor_line > 0 {
                self.state.cursor_line = self.state.cursor_line.saturating_sub(1);
                let prev_line = self.state.lines[self.state.cursor_line].as_str();
                self.set_cursor_col(prev_line.len());
            }
            return;
        }

        let before_cursor = &current_line[..self.state.cursor_col];
        let mut graphemes: Vec<&str> = grapheme_segments(before_cursor).collect();
        let mut new_col = self.state.cursor_col;

        while let Some(last) = graphemes.last() {
            if is_whitespace_segment(last) {
                new_col = new_col.saturating_sub(last.len());
                graphemes.pop();
            } else {
                break;
            }
        }

        if let Some(last) = graphemes.last() {
            if is_punctuation_segment(last) {
                while let Some(last) = graphemes.last() {
                    if is_punctuation_segment(last) {
                        new_col = new_col.saturating_sub(last.len());
                        graphemes.pop();
                    } else {
                        break;
                    }
                }
            } else {
                while let Some(last) = graphemes.last() {
                    if !is_whitespace_segment(last) && !is_punctuation_segment(last) {
                        new_col = new_col.saturating_sub(last.len());
                        graphemes.pop();
                    } else {
                        break;
                    }
                }
            }
        }

        self.set_cursor_col(new_col);
    }

    fn move_word_forwards(&mut self) {
        let current_line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .map(String::as_str)
            .unwrap_or("");

        if self.state.cursor_col >= current_line.len() {
            if self.state.cursor_line + 1 < self.state.lines.len() {
                self.state.cursor_line += 1;
                self.set_cursor_col(0);
            }
            return;
        }

        let after_cursor = &current_line[self.state.cursor_col..];
        let mut iter = grapheme_segments(after_cursor);
        let mut next = iter.next();
        let mut new_col = self.state.cursor_col;

        while let Some(seg) = next {
            if is_whitespace_segment(seg) {
                new_col += seg.len();
                next = iter.next();
            } else {
                break;
            }
        }

        if let Some(seg) = next {
            if is_punctuation_segment(seg) {
                let mut current = Some(seg);
                while let Some(seg) = current {
                    if is_punctuation_segment(seg) {
                        new_col += seg.len();
                        current = iter.next();
                    } else {
                        break;
                    }
                }
            } else {
                let mut current = Some(seg);
                while let Some(seg) = current {
                    if !is_whitespace_segment(seg) && !is_punctuation_segment(seg) {
                        new_col += seg.len();
                        current = iter.next();
                    } else {
                        break;
                    }
                }
            }
        }

        self.set_cursor_col(new_col);
    }

    fn page_scroll(&mut self, direction: isize) {
        let page_size = max(5, (self.terminal_rows.saturating_mul(3)) / 10);
        let visual_lines = self.build_visual_line_map(self.last_width);
        let current_visual_line = self.find_current_visual_line(&visual_lines);
        let target_visual = if direction.is_negative() {
            current_visual_line.saturating_sub(page_size)
        } else {
            min(
                visual_lines.len().saturating_sub(1),
                current_visual_line.saturating_add(page_size),
            )
        };
        self.move_to_visual_line(&visual_lines, current_visual_line, target_visual);
    }

    fn set_cursor_col(&mut self, col: usize) {
        self.state.cursor_col = col;
        self.preferred_visual_col = None;
        if let Some(line) = self.state.lines.get(self.state.cursor_line) {
            if self.state.cursor_col > line.len() {
                self.state.cursor_col = line.len();
            }
            while self.state.cursor_col > 0 && !line.is_char_boundary(self.state.cursor_col) {
                self.state.cursor_col = self.state.cursor_col.saturating_sub(1);
            }
        }
    }

    fn is_on_first_visual_line(&self) -> bool {
        let visual_lines = self.build_visual_line_map(self.last_width);
        self.find_current_visual_line(&visual_lines) == 0
    }

    fn is_on_last_visual_line(&self) -> bool {
        let visual_lines = self.build_visual_line_map(self.last_width);
        let current = self.find_current_visual_line(&visual_lines);
        current + 1 == visual_lines.len()
    }

    fn is_editor_empty(&self) -> bool {
        self.state.lines.len() == 1 && self.state.lines[0].is_empty()
    }

    fn navigate_history(&mut self, direction: isize) {
        if self.history.is_empty() {
            return;
        }
        let new_index = self.history_index - direction;
        if new_index < -1 || new_index as usize >= self.history.len() {
            return;
        }
        self.history_index = new_index;
        if self.history_index == -1 {
            self.set_text_internal("");
        } else {
            let idx = self.history_index as usize;
            let text = self.history.get(idx).cloned().unwrap_or_default();
            self.set_text_internal(&text);
        }
    }

    fn set_text_internal(&mut self, text: &str) {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines: Vec<String> = normalized.split('\n').map(|part| part.to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        self.state.lines = lines;
        self.state.cursor_line = self.state.lines.len().saturating_sub(1);
        let last_len = self.state.lines[self.state.cursor_line].len();
        self.set_cursor_col(last_len);
        self.scroll_offset = 0;
        self.emit_change();
    }

    // --- autocomplete overlay -------------------------------------------

    fn text_before_cursor(&self) -> &str {
        let line = self
            .state
            .lines
            .get(self.state.cursor_line)
            .map(String::as_str)
            .unwrap_or("");
        line.get(..self.state.cursor_col).unwrap_or(line)
    }

    fn in_slash_context(&self) -> bool {
        let before = self.text_before_cursor();
        let trimmed = before.trim_start();
        trimmed.starts_with('/') && !trimmed.chars().any(char::is_whitespace)
    }

    fn in_at_context(&self) -> bool {
        let before = self.text_before_cursor();
        let token_start = before
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map(|(idx, ch)| idx + ch.len_utf8())
            .unwrap_or(0);
        before[token_start..].starts_with('@')
    }

    fn maybe_activate_after_insert(&mut self, ch: &str) {
        if self.provider.is_none() {
            return;
        }

        if ch == "/" {
            // Only a slash opening the message starts command completion.
            if self.state.cursor_line == 0 && self.text_before_cursor().trim_start() == "/" {
                self.try_activate_autocomplete(false);
            }
            return;
        }

        if ch == "@" {
            let before = self.text_before_cursor();
            let before_at = &before[..before.len().saturating_sub(1)];
            // Either branch may fire: `@` opening the line, or `@` with
            // whitespace in front of it.
            let at_line_start = before_at.is_empty();
            let after_whitespace = before_at
                .chars()
                .last()
                .map(char::is_whitespace)
                .unwrap_or(false);
            if at_line_start || after_whitespace {
                self.try_activate_autocomplete(false);
            }
            return;
        }

        let word_like = ch
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if word_like && (self.in_slash_context() || self.in_at_context()) {
            self.try_activate_autocomplete(false);
        }
    }

    /// Post-mutation overlay maintenance: refresh while active, otherwise
    /// re-check the trigger contexts around the cursor.
    fn sync_autocomplete(&mut self) {
        if self.autocomplete.is_some() {
            self.refresh_autocomplete();
        } else if self.in_slash_context() || self.in_at_context() {
            self.try_activate_autocomplete(false);
        }
    }

    fn query_provider(&self, forced: bool) -> Option<crate::core::autocomplete::AutocompleteSuggestions> {
        let provider = self.provider.as_ref()?;
        let (cursor_line, cursor_col) = (self.state.cursor_line, self.state.cursor_col);
        if forced {
            if provider.should_trigger_file_completion(&self.state.lines, cursor_line, cursor_col) {
                provider
                    .get_force_file_suggestions(&self.state.lines, cursor_line, cursor_col)
                    .or_else(|| provider.get_suggestions(&self.state.lines, cursor_line, cursor_col))
            } else {
                provider.get_suggestions(&self.state.lines, cursor_line, cursor_col)
            }
        } else {
            provider.get_suggestions(&self.state.lines, cursor_line, cursor_col)
        }
    }

    fn try_activate_autocomplete(&mut self, forced: bool) {
        let Some(suggestions) = self.query_provider(forced) else {
            return;
        };
        if suggestions.items.is_empty() {
            return;
        }

        let kind = if suggestions.prefix.starts_with('/') && self.in_slash_context() {
            AutocompleteKind::SlashCommand
        } else if suggestions.prefix.starts_with('@') {
            AutocompleteKind::FileReference
        } else if forced {
            AutocompleteKind::ForcedFile
        } else {
            AutocompleteKind::FileReference
        };

        self.select_list.set_items(
            suggestions
                .items
                .iter()
                .map(suggestion_to_select_item)
                .collect(),
        );
        self.select_list.set_selected_index(0);
        self.autocomplete = Some(AutocompleteContext {
            prefix: suggestions.prefix,
            kind,
        });
    }

    fn refresh_autocomplete(&mut self) {
        let Some(context) = self.autocomplete.as_ref() else {
            return;
        };
        let forced = context.kind == AutocompleteKind::ForcedFile;
        match self.query_provider(forced) {
            Some(suggestions) if !suggestions.items.is_empty() => {
                self.select_list.set_items(
                    suggestions
                        .items
                        .iter()
                        .map(suggestion_to_select_item)
                        .collect(),
                );
                if let Some(context) = self.autocomplete.as_mut() {
                    context.prefix = suggestions.prefix;
                }
            }
            _ => {
                self.autocomplete = None;
            }
        }
    }

    fn apply_selected_completion(&mut self) -> Option<AutocompleteKind> {
        let context = self.autocomplete.take()?;
        let selected = self.select_list.get_selected_item().cloned()?;
        let provider = self.provider.as_ref()?;

        let item = AutocompleteItem {
            value: selected.value,
            label: selected.label,
            description: selected.description,
        };
        let result = provider.apply_completion(
            &self.state.lines,
            self.state.cursor_line,
            self.state.cursor_col,
            &item,
            &context.prefix,
        );

        let mut lines = result.lines;
        if lines.is_empty() {
            lines.push(String::new());
        }
        self.state.lines = lines;
        self.state.cursor_line = min(result.cursor_line, self.state.lines.len() - 1);
        self.state.cursor_col = result.cursor_col;
        self.clamp_cursor();
        self.emit_change();

        Some(context.kind)
    }
}

fn suggestion_to_select_item(item: &AutocompleteItem) -> SelectItem {
    SelectItem::new(
        item.value.clone(),
        item.label.clone(),
        item.description.clone(),
    )
}

impl Component for Editor {
    fn render(&mut self, width: usize) -> Vec<String> {
        self.clamp_cursor();

        let max_padding = width.saturating_sub(1) / 2;
        let padding_x = min(self.padding_x, max_padding);
        let content_width = max(1, width.saturating_sub(padding_x * 2));
        self.last_width = content_width;

        let layout_lines = self.layout_text(content_width);

        let max_visible_lines = max(5, (self.terminal_rows.saturating_mul(3)) / 10);
        let cursor_line_index = layout_lines
            .iter()
            .position(|line| line.has_cursor)
            .unwrap_or(0);

        if cursor_line_index < self.scroll_offset {
            self.scroll_offset = cursor_line_index;
        } else if cursor_line_index >= self.scroll_offset + max_visible_lines {
            self.scroll_offset = cursor_line_index.saturating_sub(max_visible_lines - 1);
        }

        let max_scroll = layout_lines.len().saturating_sub(max_visible_lines);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let visible_lines = layout_lines
            .iter()
            .skip(self.scroll_offset)
            .take(max_visible_lines)
            .cloned()
            .collect::<Vec<_>>();

        let mut result = Vec::new();
        let left_padding = " ".repeat(padding_x);
        let right_padding = left_padding.clone();

        let lines_above = self.scroll_offset;
        result.push(self.render_border(width, lines_above, '↑', true));

        let overlay_active = self.autocomplete.is_some();
        let draw_cursor = self.focused && !overlay_active;

        for layout_line in &visible_lines {
            let mut display_text = layout_line.text.clone();

            if layout_line.has_cursor && draw_cursor {
                if let Some(cursor_pos) = layout_line.cursor_pos {
                    let cursor_pos = min(cursor_pos, display_text.len());
                    let (before, after) = display_text.split_at(cursor_pos);

                    if !after.is_empty() {
                        let mut graphemes = grapheme_segments(after);
                        let first = graphemes.next().unwrap_or("");
                        let rest = &after[first.len()..];
                        display_text =
                            format!("{before}{CURSOR_MARKER}\x1b[7m{first}\x1b[0m{rest}");
                    } else if visible_width(before) >= content_width {
                        // No room for the end-of-line cursor cell; highlight
                        // the last grapheme instead.
                        let last = grapheme_segments(before).last().unwrap_or("");
                        let head = &before[..before.len() - last.len()];
                        display_text = format!("{head}{CURSOR_MARKER}\x1b[7m{last}\x1b[0m");
                    } else {
                        display_text = format!("{before}{CURSOR_MARKER}\x1b[7m \x1b[0m");
                    }
                }
            }

            let mut line_visible_width = visible_width(&display_text);
            if line_visible_width > content_width {
                // A grapheme wider than the content area (e.g. CJK at W=1)
                // still has to fit the fixed-width row.
                display_text = truncate_to_width(&display_text, content_width, "", false);
                line_visible_width = visible_width(&display_text);
            }
            let padding = " ".repeat(content_width.saturating_sub(line_visible_width));
            result.push(format!(
                "{left_padding}{display_text}{padding}{right_padding}"
            ));
        }

        let lines_below = layout_lines
            .len()
            .saturating_sub(self.scroll_offset + visible_lines.len());
        result.push(self.render_border(width, lines_below, '↓', false));

        if overlay_active {
            for row in self.select_list.render(content_width) {
                let mut row = row;
                let mut row_width = visible_width(&row);
                if row_width > content_width {
                    row = truncate_to_width(&row, content_width, "", false);
                    row_width = visible_width(&row);
                }
                let padding = " ".repeat(content_width.saturating_sub(row_width));
                result.push(format!("{left_padding}{row}{padding}{right_padding}"));
            }
        }

        result
    }

    fn set_terminal_rows(&mut self, rows: usize) {
        Editor::set_terminal_rows(self, rows);
    }

    fn handle_input(&mut self, data: &str) {
        self.clamp_cursor();

        if self.debug.is_enabled() {
            self.debug.log(&format!("input: {data:?}"));
        }

        let mut data = data.to_string();

        if data.contains(PASTE_START) {
            self.is_in_paste = true;
            self.paste_buffer.clear();
            data = data.replacen(PASTE_START, "", 1);
        }

        if self.is_in_paste {
            self.paste_buffer.push_str(&data);
            if let Some(end_index) = self.paste_buffer.find(PASTE_END) {
                let paste_content = self.paste_buffer[..end_index].to_string();
                if !paste_content.is_empty() {
                    self.handle_paste(&paste_content);
                }
                self.is_in_paste = false;
                let remaining = self.paste_buffer[end_index + PASTE_END.len()..].to_string();
                self.paste_buffer.clear();
                if !remaining.is_empty() {
                    self.handle_input(&remaining);
                }
            }
            return;
        }

        if self.pending_backslash {
            self.pending_backslash = false;
            if data == "\r" {
                self.add_new_line();
                return;
            }
            self.insert_character("\\");
            // The withheld backslash is in; the new event proceeds normally.
        }

        if data == "\\" {
            self.pending_backslash = true;
            return;
        }

        let kb = get_editor_keybindings();
        let kb = kb.lock().expect("editor keybindings lock poisoned");

        if kb.matches(&data, EditorAction::Copy) {
            return;
        }

        if self.autocomplete.is_some() {
            if kb.matches(&data, EditorAction::SelectUp) {
                self.select_list.select_previous();
                return;
            }
            if kb.matches(&data, EditorAction::SelectDown) {
                self.select_list.select_next();
                return;
            }
            if kb.matches(&data, EditorAction::SelectCancel) {
                self.autocomplete = None;
                return;
            }
            if kb.matches(&data, EditorAction::SelectConfirm) {
                if let Some(AutocompleteKind::SlashCommand) = self.apply_selected_completion() {
                    if !self.disable_submit {
                        self.submit_value();
                    }
                }
                return;
            }
            if kb.matches(&data, EditorAction::Tab) {
                self.apply_selected_completion();
                return;
            }
        }

        if kb.matches(&data, EditorAction::DeleteToLineEnd) {
            self.delete_to_end_of_line();
            return;
        }
        if kb.matches(&data, EditorAction::DeleteToLineStart) {
            self.delete_to_start_of_line();
            return;
        }
        if kb.matches(&data, EditorAction::DeleteWordBackward) {
            self.delete_word_backwards();
            return;
        }
        if kb.matches(&data, EditorAction::DeleteWordForward) {
            self.delete_word_forwards();
            return;
        }
        if kb.matches(&data, EditorAction::DeleteCharBackward)
            || crate::core::input::matches_key(&data, "shift+backspace")
        {
            self.handle_backspace();
            return;
        }
        if kb.matches(&data, EditorAction::DeleteCharForward)
            || crate::core::input::matches_key(&data, "shift+delete")
        {
            self.handle_forward_delete();
            return;
        }

        if kb.matches(&data, EditorAction::CursorLineStart) {
            self.move_to_line_start();
            return;
        }
        if kb.matches(&data, EditorAction::CursorLineEnd) {
            self.move_to_line_end();
            return;
        }
        if kb.matches(&data, EditorAction::CursorWordLeft) {
            self.move_word_backwards();
            return;
        }
        if kb.matches(&data, EditorAction::CursorWordRight) {
            self.move_word_forwards();
            return;
        }

        let is_new_line = kb.matches(&data, EditorAction::NewLine)
            || data == "\n"
            || data == "\x1b\r"
            || data == "\x1b[13;2~"
            || (data.len() > 1 && data.contains('\x1b') && data.contains('\r'));
        if is_new_line {
            self.add_new_line();
            return;
        }

        if kb.matches(&data, EditorAction::Submit) {
            if self.disable_submit {
                return;
            }
            self.submit_value();
            return;
        }

        if kb.matches(&data, EditorAction::CursorUp) {
            if self.is_editor_empty() {
                self.navigate_history(-1);
            } else if self.history_index > -1 && self.is_on_first_visual_line() {
                self.navigate_history(-1);
            } else if self.is_on_first_visual_line() {
                self.move_to_line_start();
            } else {
                self.move_cursor(-1, 0);
            }
            return;
        }
        if kb.matches(&data, EditorAction::CursorDown) {
            if self.history_index > -1 && self.is_on_last_visual_line() {
                self.navigate_history(1);
            } else if self.is_on_last_visual_line() {
                self.move_to_line_end();
            } else {
                self.move_cursor(1, 0);
            }
            return;
        }
        if kb.matches(&data, EditorAction::CursorRight) {
            self.move_cursor(0, 1);
            return;
        }
        if kb.matches(&data, EditorAction::CursorLeft) {
            self.move_cursor(0, -1);
            return;
        }

        if kb.matches(&data, EditorAction::PageUp) {
            self.page_scroll(-1);
            return;
        }
        if kb.matches(&data, EditorAction::PageDown) {
            self.page_scroll(1);
            return;
        }

        if kb.matches(&data, EditorAction::Tab) {
            self.try_activate_autocomplete(true);
            return;
        }

        if crate::core::input::matches_key(&data, "shift+space") {
            self.insert_character(" ");
            return;
        }

        if let Some(decoded) = decode_kitty_printable(&data) {
            self.insert_character(&decoded);
            return;
        }

        if data
            .chars()
            .next()
            .map(|ch| (ch as u32) >= 32)
            .unwrap_or(false)
        {
            self.insert_character(&data);
        }
    }

    fn invalidate(&mut self) {}

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for Editor {
    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

impl Editor {
    fn render_border(&self, width: usize, overflow: usize, arrow: char, is_top: bool) -> String {
        let mut line = if overflow > 0 {
            let indicator = format!("─── {arrow} {overflow} more ");
            let indicator_width = visible_width(&indicator);
            if indicator_width <= width {
                format!("{}{}", indicator, "─".repeat(width - indicator_width))
            } else {
                "─".repeat(width)
            }
        } else {
            "─".repeat(width)
        };

        if width >= 2 {
            if let Some((top_left, top_right, bottom_left, bottom_right)) =
                self.border_style.corners()
            {
                let (left, right) = if is_top {
                    (top_left, top_right)
                } else {
                    (bottom_left, bottom_right)
                };
                let mut chars: Vec<char> = line.chars().collect();
                chars[0] = left;
                let last = chars.len() - 1;
                chars[last] = right;
                line = chars.into_iter().collect();
            }
        }

        (self.border_color)(&line)
    }
}

impl EditorComponent for Editor {
    fn get_text(&self) -> String {
        Editor::get_text(self)
    }

    fn set_text(&mut self, text: &str) {
        Editor::set_text(self, text);
    }

    fn insert_text_at_cursor(&mut self, text: &str) {
        Editor::insert_text_at_cursor(self, text);
    }

    fn get_expanded_text(&self) -> String {
        Editor::get_expanded_text(self)
    }

    fn set_on_submit(&mut self, handler: Option<Box<dyn FnMut(String)>>) {
        Editor::set_on_submit(self, handler);
    }

    fn set_on_change(&mut self, handler: Option<Box<dyn FnMut(String)>>) {
        Editor::set_on_change(self, handler);
    }

    fn add_to_history(&mut self, text: &str) {
        Editor::add_to_history(self, text);
    }

    fn set_autocomplete_provider(&mut self, provider: Box<dyn AutocompleteProvider>) {
        Editor::set_autocomplete_provider(self, provider);
    }

    fn is_showing_autocomplete(&self) -> bool {
        Editor::is_showing_autocomplete(self)
    }

    fn set_border_color(&mut self, border_color: Box<dyn Fn(&str) -> String>) {
        Editor::set_border_color(self, border_color);
    }

    fn set_border_style(&mut self, style: BorderStyle) {
        Editor::set_border_style(self, style);
    }

    fn set_padding_x(&mut self, padding: usize) {
        Editor::set_padding_x(self, padding);
    }

    fn set_autocomplete_max_visible(&mut self, max_visible: usize) {
        Editor::set_autocomplete_max_visible(self, max_visible);
    }
}

fn decode_kitty_printable(data: &str) -> Option<String> {
    if !data.starts_with("\x1b[") || !data.ends_with('u') {
        return None;
    }
    let inner = &data[2..data.len() - 1];
    let (left, right) = match inner.split_once(';') {
        Some((left, right)) => (left, right),
        None => (inner, ""),
    };

    let mut left_parts = left.split(':');
    let codepoint = left_parts
        .next()
        .and_then(|value| value.parse::<u32>().ok())?;
    let shifted = left_parts.next().and_then(|value| {
        if value.is_empty() {
            None
        } else {
            value.parse::<u32>().ok()
        }
    });

    let mod_value = if right.is_empty() {
        1u32
    } else {
        right
            .split(':')
            .next()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(1)
    };
    let modifier = mod_value.saturating_sub(1);

    const MOD_SHIFT: u32 = 1;
    const MOD_ALT: u32 = 2;
    const MOD_CTRL: u32 = 4;

    // Alt/Ctrl chords belong to the host, not the text buffer.
    if modifier & (MOD_ALT | MOD_CTRL) != 0 {
        return None;
    }

    let mut effective = codepoint;
    if modifier & MOD_SHIFT != 0 {
        if let Some(shifted) = shifted {
            effective = shifted;
        }
    }
    if effective < 32 {
        return None;
    }
    char::from_u32(effective).map(|ch| ch.to_string())
}
