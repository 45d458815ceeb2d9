//! Terminal renderer.
//!
//! Turns a generation into a text frame and draws it in place:
//!
//! ```text
//! Grid ──→ FrameRenderer ──→ DisplaySurface ──→ TerminalSurface (ANSI → stdout)
//!                                          └──→ CaptureSurface  (virtual screen)
//! ```
//!
//! The frame renderer only knows about rows, borders and glyphs. Escape codes
//! live in [`ansi`] and are emitted by [`TerminalSurface`] alone.

pub mod ansi;
pub mod frame;
pub mod output;
pub mod surface;
pub mod terminal;

pub use frame::{FrameLayout, FrameRenderer, DEAD_GLYPH, LIVE_GLYPH};
pub use output::OutputBuffer;
pub use surface::{CaptureSurface, DisplaySurface};
pub use terminal::{SurfaceModes, TerminalSurface};
