//! Component and Focusable traits.

use crate::core::input_event::InputEvent;

/// Renderable widget interface. The host drives one `handle_input` call per
/// keyboard event and one `render` call per frame, both on its main loop.
pub trait Component {
    /// Render to a list of fully-styled lines at the given width.
    fn render(&mut self, width: usize) -> Vec<String>;

    /// Handle a raw input chunk (UTF-8 plus escape sequences).
    fn handle_input(&mut self, _data: &str) {}

    /// Handle a structured input event.
    ///
    /// Prefer overriding this method instead of `handle_input`.
    fn handle_event(&mut self, event: &InputEvent) {
        self.handle_input(&event.raw)
    }

    /// Invalidate any cached state.
    fn invalidate(&mut self) {}

    /// Provide the current terminal row count (optional).
    fn set_terminal_rows(&mut self, _rows: usize) {}

    /// Whether this component wants key-release events.
    fn wants_key_release(&self) -> bool {
        false
    }

    /// Optional focusable behavior for cursor handling.
    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }
}

/// Focus tracking for components that draw their own cursor.
pub trait Focusable {
    fn set_focused(&mut self, focused: bool);
    fn is_focused(&self) -> bool;
}
