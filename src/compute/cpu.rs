//! Host-side compute session.
//!
//! Evaluates [`rule::next_cell`](super::rule::next_cell) for every cell with
//! rayon, one task per output row. Rows are disjoint slices of the output
//! buffer and the input buffer is only read, so the result does not depend on
//! how rayon schedules the rows.

use rayon::prelude::*;

use super::{check_len, rule, ComputeSession};
use crate::error::ComputeError;

/// Data-parallel CPU implementation of [`ComputeSession`].
#[derive(Debug, Clone)]
pub struct CpuSession {
    width: usize,
    height: usize,
    input: Vec<u8>,
    output: Vec<u8>,
}

impl CpuSession {
    /// Create a session with all-dead buffers.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            input: vec![0; width * height],
            output: vec![0; width * height],
        }
    }
}

impl ComputeSession for CpuSession {
    fn describe(&self) -> String {
        format!("cpu ({} threads)", rayon::current_num_threads())
    }

    fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError> {
        check_len(self.shape(), cells.len())?;
        self.input.copy_from_slice(cells);
        Ok(())
    }

    fn dispatch(&mut self) -> Result<(), ComputeError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let input = &self.input;
        self.output
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = rule::next_cell(input, width, height, x, y);
                }
            });
        Ok(())
    }

    fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError> {
        check_len(self.shape(), out.len())?;
        out.copy_from_slice(&self.output);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
