//! Cell grid - the state of one generation.
//!
//! A grid is a fixed `width × height` rectangle of binary cells stored in
//! row-major order, one byte per cell (`0` dead, `1` alive). The byte layout
//! is what the compute sessions upload and read back, so it stays flat.

use std::fmt;

/// Byte value of a dead cell.
pub const DEAD: u8 = 0;

/// Byte value of a live cell.
pub const ALIVE: u8 = 1;

/// A rectangular generation of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![DEAD; width * height],
        }
    }

    /// Wrap an existing row-major cell vector.
    ///
    /// Returns `None` if `cells.len() != width * height`. Any non-zero byte
    /// is normalized to [`ALIVE`].
    pub fn from_cells(width: usize, height: usize, mut cells: Vec<u8>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        for cell in &mut cells {
            *cell = u8::from(*cell != DEAD);
        }
        Some(Self { width, height, cells })
    }

    /// Build a grid from a list of live `(x, y)` coordinates.
    ///
    /// Coordinates outside the grid are ignored.
    pub fn with_live(width: usize, height: usize, live: &[(usize, usize)]) -> Self {
        let mut grid = Self::new(width, height);
        for &(x, y) in live {
            grid.set(x, y, true);
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Same width and height as `other`.
    #[inline]
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Whether the cell at `(x, y)` is alive. Out-of-bounds cells are dead.
    #[inline]
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x] != DEAD
    }

    /// Set the cell at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = u8::from(alive);
        }
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c != DEAD).count()
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Raw row-major cells.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Raw row-major cells, mutable. Used by sessions to fill a snapshot.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }
}

/// Renders the grid in map notation (`#` alive, `.` dead), one row per line.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for &cell in self.row(y) {
                f.write_str(if cell != DEAD { "#" } else { "." })?;
            }
            if y + 1 < self.height {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
