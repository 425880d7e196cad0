#![forbid(unsafe_code)]

//! Host-environment primitives for velum overlays.
//!
//! This crate provides everything the modal layer needs from its host:
//! - [`geometry`]: rectangles and sizes on the cell grid
//! - [`event`]: key and mouse input events
//! - [`style`]: colors, attribute flags, and the class-name stylesheet
//!   contract ([`Stylesheet`])
//! - [`frame`]: the cell buffer render surface with an optional hit grid
//!   for mouse routing

pub mod event;
pub mod frame;
pub mod geometry;
pub mod style;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use frame::{Buffer, Cell, Frame, HitId, HitRegion};
pub use geometry::{Rect, Size};
pub use style::{ClassMap, Rgba, Style, StyleFlags, Stylesheet};
