#![forbid(unsafe_code)]

//! Modal overlays for velum.
//!
//! The [`modal`] module is the whole public surface: a template-driven
//! modal component with stacking, animated open/close transitions, and a
//! shared scroll lock. See [`modal::Modal`] for the lifecycle entry point
//! and [`modal::OverlayContext`] for the shared state every instance
//! cooperates through.

pub mod modal;

use velum_core::frame::{Buffer, Cell, Frame};
use velum_core::geometry::Rect;
use velum_core::style::Style;

/// Helper to apply a partial style to a cell, leaving unset fields alone.
pub(crate) fn apply_style(cell: &mut Cell, style: Style) {
    if let Some(fg) = style.fg {
        cell.fg = fg;
    }
    if let Some(bg) = style.bg {
        cell.bg = bg;
    }
    if let Some(attrs) = style.attrs {
        cell.attrs |= attrs;
    }
}

/// Apply a style to all cells in a rectangular area.
///
/// This modifies existing cells, preserving their content.
pub(crate) fn set_style_area(buf: &mut Buffer, area: Rect, style: Style) {
    if style.is_empty() {
        return;
    }
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if let Some(cell) = buf.get_mut(x, y) {
                apply_style(cell, style);
            }
        }
    }
}

/// Draw a text span into a frame at the given position.
///
/// Returns the x position after the last drawn character.
/// Stops at `max_x` (exclusive). Zero-width graphemes are skipped; a
/// multi-cell grapheme draws its first scalar and pads the rest.
pub(crate) fn draw_text_span(
    frame: &mut Frame,
    mut x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    for grapheme in content.graphemes(true) {
        if x >= max_x {
            break;
        }
        let w = UnicodeWidthStr::width(grapheme);
        if w == 0 {
            continue;
        }
        if x + w as u16 > max_x {
            break;
        }
        let Some(ch) = grapheme.chars().next() else {
            continue;
        };

        let mut cell = Cell::from_char(ch);
        apply_style(&mut cell, style);
        frame.buffer.set(x, y, cell);
        for pad in 1..w as u16 {
            let mut filler = Cell::from_char(' ');
            apply_style(&mut filler, style);
            frame.buffer.set(x + pad, y, filler);
        }

        x = x.saturating_add(w as u16);
    }
    x
}
