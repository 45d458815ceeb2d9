//! Initial map loading.
//!
//! A map is plain text, one grid row per line. `.` is a dead cell, any other
//! character is alive. Trailing whitespace is trimmed and blank lines are
//! dropped, so maps can be edited freely in any editor.

use std::fs;
use std::path::Path;

use crate::error::MapError;
use crate::grid::Grid;

/// Character that marks a dead cell.
pub const DEAD_CHAR: char = '.';

/// Read and parse the map at `path`.
///
/// The file is not required to be UTF-8. Invalid bytes decode to U+FFFD,
/// which counts as one live cell.
pub fn load_map(path: &Path) -> Result<Grid, MapError> {
    let bytes = fs::read(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = parse_map(&String::from_utf8_lossy(&bytes))?;
    tracing::info!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        population = grid.population(),
        "loaded map"
    );
    Ok(grid)
}

/// Parse map text into a grid.
///
/// Every remaining row must have the width of the first one.
pub fn parse_map(text: &str) -> Result<Grid, MapError> {
    let rows: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches([' ', '\t', '\r']))
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first) = rows.first() else {
        return Err(MapError::Empty);
    };
    let width = first.chars().count();
    let height = rows.len();

    let mut cells = Vec::with_capacity(width * height);
    for (index, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(MapError::RaggedRow {
                row: index + 1,
                expected: width,
                found,
            });
        }
        cells.extend(row.chars().map(|c| u8::from(c != DEAD_CHAR)));
    }

    // Length is width * height by construction.
    Grid::from_cells(width, height, cells).ok_or(MapError::Empty)
}

// =============================================================================
// Tests
// =============================================================================
