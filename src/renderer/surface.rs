//! Display surface - what the frame renderer draws on.
//!
//! The renderer never emits escape codes itself. It moves the cursor, writes
//! text and toggles cursor visibility through [`DisplaySurface`], then calls
//! [`present`](DisplaySurface::present) once per frame.
//!
//! - [`TerminalSurface`](super::TerminalSurface): ANSI output to a terminal
//! - [`CaptureSurface`]: a virtual screen that records presented frames

use std::io;

/// A text display with a movable cursor.
pub trait DisplaySurface {
    /// Current size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Blank the whole display and home the cursor.
    fn clear(&mut self) -> io::Result<()>;

    /// Move the cursor to a 0-indexed `(column, row)`.
    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()>;

    /// Write plain text at the cursor. `\n` moves to the start of the next row.
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// Write text in the highlight (live cell) colour.
    fn write_highlight(&mut self, text: &str) -> io::Result<()>;

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()>;

    fn cursor_visible(&self) -> bool;

    /// Make everything written since the last call visible at once.
    fn present(&mut self) -> io::Result<()>;
}

impl<S: DisplaySurface + ?Sized> DisplaySurface for &mut S {
    fn size(&self) -> io::Result<(u16, u16)> {
        (**self).size()
    }
    fn clear(&mut self) -> io::Result<()> {
        (**self).clear()
    }
    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        (**self).move_to(column, row)
    }
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }
    fn write_highlight(&mut self, text: &str) -> io::Result<()> {
        (**self).write_highlight(text)
    }
    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        (**self).set_cursor_visible(visible)
    }
    fn cursor_visible(&self) -> bool {
        (**self).cursor_visible()
    }
    fn present(&mut self) -> io::Result<()> {
        (**self).present()
    }
}

// =============================================================================
// CaptureSurface
// =============================================================================

/// In-memory surface for tests and headless runs.
///
/// Keeps a `columns × rows` character screen. Each [`present`] that follows
/// a write records the screen as one frame (rows joined by `\n`, trailing
/// blanks trimmed). Writes past the edge of the screen are dropped.
///
/// [`present`]: DisplaySurface::present
#[derive(Debug, Clone)]
pub struct CaptureSurface {
    columns: u16,
    rows: u16,
    screen: Vec<Vec<char>>,
    cursor: (usize, usize),
    cursor_visible: bool,
    dirty: bool,
    clears: usize,
    frames: Vec<String>,
    fail_on_frame: Option<usize>,
}

impl CaptureSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            screen: vec![vec![' '; usize::from(columns)]; usize::from(rows)],
            cursor: (0, 0),
            cursor_visible: true,
            dirty: false,
            clears: 0,
            frames: Vec::new(),
            fail_on_frame: None,
        }
    }

    /// Make the `n`th frame (1-based) fail to present, once.
    pub fn fail_on_frame(mut self, n: usize) -> Self {
        self.fail_on_frame = Some(n);
        self
    }

    /// Frames presented so far.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// Number of [`clear`](DisplaySurface::clear) calls.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Current screen contents in frame format.
    pub fn screen_text(&self) -> String {
        let lines: Vec<String> = self
            .screen
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        lines.join("\n")
    }

    fn put(&mut self, text: &str) {
        for c in text.chars() {
            let (col, row) = self.cursor;
            if c == '\n' {
                self.cursor = (0, row + 1);
                continue;
            }
            if let Some(cell) = self.screen.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = c;
            }
            self.cursor = (col + 1, row);
        }
        self.dirty = true;
    }
}

impl DisplaySurface for CaptureSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.columns, self.rows))
    }

    fn clear(&mut self) -> io::Result<()> {
        for row in &mut self.screen {
            row.fill(' ');
        }
        self.cursor = (0, 0);
        self.clears += 1;
        Ok(())
    }

    fn move_to(&mut self, column: u16, row: u16) -> io::Result<()> {
        self.cursor = (usize::from(column), usize::from(row));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.put(text);
        Ok(())
    }

    fn write_highlight(&mut self, text: &str) -> io::Result<()> {
        self.put(text);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> io::Result<()> {
        self.cursor_visible = visible;
        Ok(())
    }

    fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    fn present(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        if self.fail_on_frame == Some(self.frames.len() + 1) {
            self.fail_on_frame = None;
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "capture surface closed"));
        }
        self.frames.push(self.screen_text());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_present() {
        let mut surface = CaptureSurface::new(10, 3);
        surface.move_to(2, 1).unwrap();
        surface.write_text("hi\nyo").unwrap();
        surface.present().unwrap();
        assert_eq!(surface.frames(), &["\n  hi\nyo".to_string()]);
    }

    #[test]
    fn test_present_without_writes_records_nothing() {
        let mut surface = CaptureSurface::new(4, 2);
        surface.set_cursor_visible(false).unwrap();
        surface.present().unwrap();
        assert!(surface.frames().is_empty());
        assert!(!surface.cursor_visible());
    }

    #[test]
    fn test_offscreen_writes_dropped() {
        let mut surface = CaptureSurface::new(3, 1);
        surface.write_text("abcdef\nxyz").unwrap();
        assert_eq!(surface.screen_text(), "abc");
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let mut surface = CaptureSurface::new(4, 1).fail_on_frame(1);
        surface.write_text("a").unwrap();
        assert!(surface.present().is_err());
        surface.write_text("b").unwrap();
        surface.present().unwrap();
        assert_eq!(surface.frames().len(), 1);
    }
}
