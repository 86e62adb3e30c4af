//! Multi-line prompt editor widget for terminal UIs.
//!
//! The editor consumes raw input chunks (UTF-8 plus escape sequences) and
//! renders to fixed-width styled lines; the host owns the terminal and maps
//! the embedded cursor marker to hardware cursor positioning.

pub mod config;
pub mod logging;

pub mod core;
pub mod widgets;

// Autocomplete support
pub use crate::core::autocomplete::{
    AutocompleteItem, AutocompleteProvider, AutocompleteSuggestions, CombinedAutocompleteProvider,
    CommandEntry, CompletionResult, SlashCommand,
};

// Components
pub use crate::widgets::{
    word_wrap_line, BorderStyle, Editor, EditorOptions, EditorTheme, SelectItem, SelectList,
    SelectListTheme, TextChunk,
};

// Editor component interface
pub use crate::core::editor_component::EditorComponent;

// Fuzzy matching
pub use crate::core::fuzzy::{fuzzy_filter, fuzzy_match, FuzzyMatch};

// Keybindings
pub use crate::core::keybindings::{
    default_editor_keybindings_handle, get_editor_keybindings, EditorAction,
    EditorKeybindingsConfig, EditorKeybindingsHandle, EditorKeybindingsManager, KeyBinding, KeyId,
    DEFAULT_EDITOR_KEYBINDINGS,
};

// Keyboard input handling
pub use crate::core::input::{
    is_key_release, matches_key, parse_key, set_kitty_protocol_active, KeyEventType,
};
pub use crate::core::input_event::InputEvent;

// Component traits and host-side cursor mapping
pub use crate::core::component::{Component, Focusable};
pub use crate::core::cursor::{extract_cursor_marker, CursorPos, CURSOR_MARKER};

pub fn is_focusable(component: &mut dyn Component) -> bool {
    component.as_focusable().is_some()
}

// Utilities
pub use crate::core::text::utils::truncate_to_width;
pub use crate::core::text::width::visible_width;
