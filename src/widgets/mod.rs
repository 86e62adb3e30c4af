//! Widgets.

pub mod editor;
pub mod select_list;

pub use editor::{word_wrap_line, BorderStyle, Editor, EditorOptions, EditorTheme, TextChunk};
pub use select_list::{SelectItem, SelectList, SelectListTheme};
