#![forbid(unsafe_code)]

//! The cell render surface and hit grid.
//!
//! A [`Frame`] wraps a [`Buffer`] of cells plus an optional hit grid.
//! Widgets register hit regions as they draw; later registrations
//! overwrite earlier ones, so draw order doubles as z-order. The host
//! queries [`Frame::hit_test`] with a mouse position to find out what was
//! clicked.

use crate::geometry::Rect;
use crate::style::{Rgba, StyleFlags};

/// A single screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: StyleFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgba::rgb(255, 255, 255),
            bg: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 0,
            },
            attrs: StyleFlags::empty(),
        }
    }
}

impl Cell {
    /// A default-styled cell holding `ch`.
    pub fn from_char(ch: char) -> Self {
        Self {
            ch,
            ..Self::default()
        }
    }

    /// Whether the cell holds no visible glyph.
    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

/// A width × height grid of cells.
#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    /// Buffer width in cells.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in cells.
    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read a cell, `None` when out of bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable access to a cell, `None` when out of bounds.
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Write a cell; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }
}

/// Identifies the widget that registered a hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitId(u64);

impl HitId {
    /// Create a hit id from a raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Which part of a widget a hit region covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitRegion {
    /// The dimmed area behind an overlay panel.
    Backdrop,
    /// The overlay panel itself.
    Panel,
    /// A close affordance.
    Close,
    /// A footer action button; the hit data carries its index.
    FooterButton,
    /// Widget-defined region.
    Custom(u16),
}

type HitEntry = (HitId, HitRegion, u64);

#[derive(Debug, Clone)]
struct HitGrid {
    width: u16,
    height: u16,
    entries: Vec<Option<HitEntry>>,
}

impl HitGrid {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            entries: vec![None; width as usize * height as usize],
        }
    }

    fn fill(&mut self, area: Rect, entry: HitEntry) {
        let clipped = area.intersection(Rect::new(0, 0, self.width, self.height));
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                let i = y as usize * self.width as usize + x as usize;
                self.entries[i] = Some(entry);
            }
        }
    }

    fn get(&self, x: u16, y: u16) -> Option<HitEntry> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.entries[y as usize * self.width as usize + x as usize]
    }
}

/// One frame's render target: a cell buffer plus an optional hit grid.
#[derive(Debug, Clone)]
pub struct Frame {
    pub buffer: Buffer,
    hits: Option<HitGrid>,
}

impl Frame {
    /// Create a frame without hit testing.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hits: None,
        }
    }

    /// Create a frame that records hit regions.
    pub fn with_hit_grid(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hits: Some(HitGrid::new(width, height)),
        }
    }

    /// Register a hit region over `area`. Later registrations overwrite
    /// earlier ones cell by cell.
    pub fn register_hit(&mut self, area: Rect, id: HitId, region: HitRegion, data: u64) {
        if let Some(hits) = &mut self.hits {
            hits.fill(area, (id, region, data));
        }
    }

    /// Look up the topmost hit region at a cell, if any was registered.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, u64)> {
        self.hits.as_ref()?.get(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_out_of_bounds_reads_none() {
        let buf = Buffer::new(4, 2);
        assert!(buf.get(4, 0).is_none());
        assert!(buf.get(0, 2).is_none());
        assert!(buf.get(3, 1).is_some());
    }

    #[test]
    fn buffer_set_then_get() {
        let mut buf = Buffer::new(3, 3);
        buf.set(1, 2, Cell::from_char('x'));
        assert_eq!(buf.get(1, 2).map(|c| c.ch), Some('x'));
    }

    #[test]
    fn out_of_bounds_write_dropped() {
        let mut buf = Buffer::new(2, 2);
        buf.set(5, 5, Cell::from_char('x'));
        assert!(buf.get(0, 0).is_some_and(Cell::is_blank));
    }

    #[test]
    fn later_hit_registration_wins() {
        let mut frame = Frame::with_hit_grid(10, 10);
        let id = HitId::new(1);
        frame.register_hit(Rect::new(0, 0, 10, 10), id, HitRegion::Backdrop, 0);
        frame.register_hit(Rect::new(3, 3, 4, 4), id, HitRegion::Panel, 0);

        assert_eq!(frame.hit_test(0, 0), Some((id, HitRegion::Backdrop, 0)));
        assert_eq!(frame.hit_test(4, 4), Some((id, HitRegion::Panel, 0)));
    }

    #[test]
    fn hit_test_without_grid_is_none() {
        let mut frame = Frame::new(5, 5);
        frame.register_hit(Rect::new(0, 0, 5, 5), HitId::new(1), HitRegion::Panel, 0);
        assert!(frame.hit_test(2, 2).is_none());
    }

    #[test]
    fn hit_region_clipped_to_grid() {
        let mut frame = Frame::with_hit_grid(4, 4);
        frame.register_hit(
            Rect::new(2, 2, 10, 10),
            HitId::new(7),
            HitRegion::Backdrop,
            0,
        );
        assert!(frame.hit_test(3, 3).is_some());
        assert!(frame.hit_test(0, 0).is_none());
    }

    #[test]
    fn hit_data_round_trips() {
        let mut frame = Frame::with_hit_grid(4, 1);
        frame.register_hit(
            Rect::new(0, 0, 4, 1),
            HitId::new(2),
            HitRegion::FooterButton,
            3,
        );
        assert_eq!(
            frame.hit_test(1, 0),
            Some((HitId::new(2), HitRegion::FooterButton, 3))
        );
    }
}
