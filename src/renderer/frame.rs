//! Frame renderer - one generation as a centred, bordered text frame.
//!
//! ```text
//!            Generation 42
//!
//!   ┌────────────────────────┐
//!   │    ████                │
//!   │      ██████            │
//!   └────────────────────────┘
//! ```
//!
//! Each cell is two columns wide so it looks roughly square in a terminal.
//! The layout is computed once, from the surface size at [`begin`], and every
//! frame is drawn over the previous one starting from the same cursor
//! position. Nothing is cleared between frames.
//!
//! [`begin`]: FrameRenderer::begin

use std::io;

use super::surface::DisplaySurface;
use crate::grid::{Grid, DEAD};

/// Glyph pair for a live cell.
pub const LIVE_GLYPH: &str = "██";
/// Glyph pair for a dead cell.
pub const DEAD_GLYPH: &str = "  ";

const CELL_COLUMNS: usize = 2;
/// Header, blank line, top and bottom border.
const CHROME_ROWS: usize = 4;

// =============================================================================
// Layout
// =============================================================================

/// Where the frame sits on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Blank rows above the header.
    pub top_pad: u16,
    /// Blank columns left of the border.
    pub left_pad: usize,
    /// Border-to-border width in columns.
    pub frame_width: usize,
}

impl FrameLayout {
    /// Centre a `grid_width × grid_height` grid on a `columns × rows` surface.
    ///
    /// Padding is zero on any axis where the frame does not fit.
    pub fn center(columns: u16, rows: u16, grid_width: usize, grid_height: usize) -> Self {
        let frame_width = grid_width * CELL_COLUMNS + 2;
        let content_height = grid_height + CHROME_ROWS;
        // At most rows / 2, so it fits in u16.
        let top_pad = (usize::from(rows).saturating_sub(content_height) / 2) as u16;
        let left_pad = usize::from(columns).saturating_sub(frame_width) / 2;
        Self {
            top_pad,
            left_pad,
            frame_width,
        }
    }

    /// Columns before a header of `header_len` so it is centred over the frame.
    ///
    /// A header wider than the frame hangs out on both sides, clipped at
    /// column 0.
    pub fn header_pad(&self, header_len: usize) -> usize {
        let offset = (self.frame_width as isize - header_len as isize) / 2;
        (self.left_pad as isize + offset).max(0) as usize
    }
}

// =============================================================================
// FrameRenderer
// =============================================================================

/// Draws generations onto a [`DisplaySurface`].
#[derive(Debug)]
pub struct FrameRenderer<S> {
    surface: S,
    grid_width: usize,
    grid_height: usize,
    layout: Option<FrameLayout>,
    /// Cursor visibility before `begin`, restored by `finish`.
    cursor_was_visible: Option<bool>,
    horizontal: String,
    scratch: String,
}

impl<S: DisplaySurface> FrameRenderer<S> {
    pub fn new(surface: S, grid_width: usize, grid_height: usize) -> Self {
        Self {
            surface,
            grid_width,
            grid_height,
            layout: None,
            cursor_was_visible: None,
            horizontal: "─".repeat(grid_width * CELL_COLUMNS),
            scratch: String::with_capacity(grid_width * LIVE_GLYPH.len()),
        }
    }

    /// Measure the surface, clear it and hide the cursor.
    ///
    /// Called automatically by the first [`render`](Self::render) if needed.
    pub fn begin(&mut self) -> io::Result<FrameLayout> {
        if let Some(layout) = self.layout {
            return Ok(layout);
        }
        let (columns, rows) = self.surface.size()?;
        let layout = FrameLayout::center(columns, rows, self.grid_width, self.grid_height);
        tracing::debug!(columns, rows, ?layout, "frame layout");

        self.surface.clear()?;
        self.cursor_was_visible = Some(self.surface.cursor_visible());
        self.surface.set_cursor_visible(false)?;
        self.layout = Some(layout);
        Ok(layout)
    }

    /// Draw `snapshot` labelled as generation `generation` and present it.
    pub fn render(&mut self, snapshot: &Grid, generation: u64) -> io::Result<()> {
        if (snapshot.width(), snapshot.height()) != (self.grid_width, self.grid_height) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "snapshot is {}x{}, renderer was built for {}x{}",
                    snapshot.width(),
                    snapshot.height(),
                    self.grid_width,
                    self.grid_height
                ),
            ));
        }
        let layout = self.begin()?;
        let indent = " ".repeat(layout.left_pad);

        self.surface.move_to(0, layout.top_pad)?;

        let header = format!("Generation {generation}");
        let header_pad = " ".repeat(layout.header_pad(header.chars().count()));
        self.surface.write_text(&format!("{header_pad}{header}\n\n"))?;

        self.surface
            .write_text(&format!("{indent}┌{}┐\n", self.horizontal))?;
        for y in 0..snapshot.height() {
            self.surface.write_text(&indent)?;
            self.surface.write_text("│")?;
            self.render_row(snapshot.row(y))?;
            self.surface.write_text("│\n")?;
        }
        self.surface
            .write_text(&format!("{indent}└{}┘\n", self.horizontal))?;

        self.surface.present()
    }

    /// Write one grid row, batching runs of equal cells into single writes.
    fn render_row(&mut self, row: &[u8]) -> io::Result<()> {
        let mut start = 0;
        while start < row.len() {
            let alive = row[start] != DEAD;
            let end = row[start..]
                .iter()
                .position(|&c| (c != DEAD) != alive)
                .map_or(row.len(), |n| start + n);

            self.scratch.clear();
            let glyph = if alive { LIVE_GLYPH } else { DEAD_GLYPH };
            for _ in start..end {
                self.scratch.push_str(glyph);
            }
            if alive {
                self.surface.write_highlight(&self.scratch)?;
            } else {
                self.surface.write_text(&self.scratch)?;
            }
            start = end;
        }
        Ok(())
    }

    /// Restore the cursor visibility seen by [`begin`](Self::begin).
    ///
    /// Safe to call any number of times, with or without `begin`.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(visible) = self.cursor_was_visible.take() {
            self.surface.set_cursor_visible(visible)?;
        }
        self.surface.present()
    }

    pub fn layout(&self) -> Option<FrameLayout> {
        self.layout
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

// =============================================================================
// Tests
// =============================================================================
