//! Terminal surface - ANSI output with guaranteed cursor restore.
//!
//! Writes go into an [`OutputBuffer`]; [`present`](DisplaySurface::present)
//! wraps them in a synchronized-output block and flushes them in one write.
//!
//! The surface remembers which terminal modes it changed. Dropping it shows
//! the cursor again if it is still hidden, so every exit path (including
//! panics and early `?` returns) leaves the terminal usable.

use std::io::{self, Stdout, Write};

use bitflags::bitflags;

use super::ansi;
use super::output::OutputBuffer;
use super::surface::DisplaySurface;

/// Size assumed when the terminal cannot be queried (not a TTY).
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

bitflags! {
    /// Terminal state this surface has changed and must undo.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SurfaceModes: u8 {
        const CURSOR_HIDDEN = 1 << 0;
        const SYNC_OPEN = 1 << 1;
    }
}

/// [`DisplaySurface`] backed by an ANSI terminal.
#[derive(Debug)]
pub struct TerminalSurface<W: Write = Stdout> {
    writer: W,
    output: OutputBuffer,
    modes: SurfaceModes,
    size_override: Option<(u16, u16)>,
}

impl TerminalSurface<Stdout> {
    /// Surface on the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            output: OutputBuffer::new(),
            modes: SurfaceModes::empty(),
            size_override: None,
        }
    }

    /// Report `size` instead of querying the terminal.
    pub fn with_size(mut self, columns: u16, rows: u16) -> Self {
        self.size_override = Some((columns, rows));
        self
    }

    pub fn modes(&self) -> SurfaceModes {
        self.modes
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Open a synchronized block before the first write of a frame.
    fn begin_write(&mut self) -> io::Result<()> {
        if !self.modes.contains(SurfaceModes::SYNC_OPEN) {
            ansi::begin_sync(&mut self.output)?;
            self.modes.insert(SurfaceModes::SYNC_OPEN);
        }
        Ok(())
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn size(&self) -> io::Result<(u16, u16)> {
        if let Some(size) = self.size_override {
            return Ok(size);
        }
        match crossterm::terminal::size() {
            Ok(size) => Ok(size),
            Err(err) => {
                tracing::debug!(error = %err, "terminal size unavailable, assuming 80x24");
                Ok(FALLBACK_SIZE)
            }
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        self.begin_write()?;
        ansi::clear_screen(&mut self.output)
    }

    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.begin_write()?;
        ansi::cursor_to(&mut self.output, column, row)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.begin_write()?;
        self.output.write_str(text);
        Ok(())
    }

    fn write_highlight(&mut self, text: &str) -> io::Result<()> {
        self.begin_write()?;
        ansi::fg_white(&mut self.output)?;
        self.output.write_str(text);
        ansi::reset(&mut self.output)
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.begin_write()?;
        if visible {
            ansi::cursor_show(&mut self.output)?;
        } else {
            ansi::cursor_hide(&mut self.output)?;
        }
        self.modes.set(SurfaceModes::CURSOR_HIDDEN, !visible);
        Ok(())
    }

    fn cursor_visible(&self) -> bool {
        !self.modes.contains(SurfaceModes::CURSOR_HIDDEN)
    }

    fn present(&mut self) -> io::Result<()> {
        if self.modes.contains(SurfaceModes::SYNC_OPEN) {
            ansi::end_sync(&mut self.output)?;
            self.modes.remove(SurfaceModes::SYNC_OPEN);
        }
        self.output.flush_to(&mut self.writer)
    }
}

impl<W: Write> Drop for TerminalSurface<W> {
    fn drop(&mut self) {
        if self.modes.contains(SurfaceModes::CURSOR_HIDDEN) {
            let _ = self.set_cursor_visible(true);
        }
        let _ = self.present();
    }
}

// =============================================================================
// Tests
// =============================================================================
