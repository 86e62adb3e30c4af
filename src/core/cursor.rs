//! Host-side cursor marker extraction.
//!
//! The editor embeds a zero-width APC marker at the cursor's byte offset
//! when focused. The host scans its composed frame for the marker, removes
//! it, and positions the hardware cursor at the reported cell.

use crate::core::text::width::visible_width;

pub const CURSOR_MARKER: &str = "\x1b_pt:c\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// Find and strip the cursor marker within the last `height` lines.
///
/// Rows below the viewport win when the marker somehow appears twice; rows
/// scrolled out above it are never touched.
pub fn extract_cursor_marker(lines: &mut [String], height: usize) -> Option<CursorPos> {
    let viewport_top = lines.len().saturating_sub(height);
    let (row, offset) = lines
        .iter()
        .enumerate()
        .skip(viewport_top)
        .rev()
        .find_map(|(row, line)| line.find(CURSOR_MARKER).map(|offset| (row, offset)))?;

    let line = &mut lines[row];
    let col = visible_width(&line[..offset]);
    line.replace_range(offset..offset + CURSOR_MARKER.len(), "");
    Some(CursorPos { row, col })
}
