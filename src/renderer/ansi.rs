//! ANSI escape sequences used by the terminal surface.
//!
//! Only what an in-place animation needs: absolute cursor moves, cursor
//! visibility, clearing, one foreground colour and synchronized output.

use std::io::{self, Write};

/// Move cursor to absolute position (0-indexed column and row).
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25l")
}

/// Show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25h")
}

/// Clear the viewport and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J\x1b[H")
}

/// White foreground (ANSI 37).
#[inline]
pub fn fg_white<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[37m")
}

/// Reset all attributes.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Begin synchronized output (terminal buffers until end).
#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026l")
}
