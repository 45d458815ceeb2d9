//! The transition rule (B3/S23) with a dead-outside-border neighbourhood.
//!
//! Every output cell is a pure function of the input grid and the cell's
//! coordinates, so cells can be evaluated in any order and in parallel. The
//! WGSL kernel in `conway.wgsl` is the device-side twin of [`next_cell`].

/// Whether a cell is alive in the next generation.
#[inline]
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    live_neighbors == 3 || (alive && live_neighbors == 2)
}

/// Count live cells in the Moore neighbourhood of `(x, y)`.
///
/// Neighbours outside the grid count as dead.
#[inline]
pub fn live_neighbors(cells: &[u8], width: usize, height: usize, x: usize, y: usize) -> u8 {
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x1 = (x + 1).min(width - 1);
    let y1 = (y + 1).min(height - 1);

    let mut count = 0;
    for ny in y0..=y1 {
        let row = &cells[ny * width..(ny + 1) * width];
        for (nx, &cell) in row.iter().enumerate().take(x1 + 1).skip(x0) {
            if (nx, ny) != (x, y) && cell != 0 {
                count += 1;
            }
        }
    }
    count
}

/// Next-generation byte for the cell at `(x, y)`.
#[inline]
pub fn next_cell(cells: &[u8], width: usize, height: usize, x: usize, y: usize) -> u8 {
    let alive = cells[y * width + x] != 0;
    u8::from(next_state(alive, live_neighbors(cells, width, height, x, y)))
}

// =============================================================================
// Tests
// =============================================================================
