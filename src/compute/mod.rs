//! Compute sessions - where the transition rule actually runs.
//!
//! A session owns a device-side input buffer and output buffer sized for one
//! grid. The step coordinator drives it through three blocking calls:
//!
//! ```text
//! write_input(current)  ──→  [input]
//! dispatch()                 [input] ──rule, one task per cell──→ [output]
//! read_output(snapshot) ←──  [output]
//! ```
//!
//! Sessions never hand out references to their buffers; the host only sees
//! copies, so nothing can observe a half-written generation.
//!
//! # Backends
//!
//! - [`GpuSession`]: WGSL compute shader through wgpu (feature `gpu`)
//! - [`CpuSession`]: the same rule, row-parallel on the host via rayon

pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod rule;

use std::fmt;

use crate::error::{ComputeError, SetupError};
use crate::grid::Grid;

pub use cpu::CpuSession;
#[cfg(feature = "gpu")]
pub use gpu::GpuSession;

/// A device that can evaluate the transition rule over a whole grid.
pub trait ComputeSession {
    /// Human-readable device description for logs.
    fn describe(&self) -> String;

    /// `(width, height)` the session was created for.
    fn shape(&self) -> (usize, usize);

    /// Replace the input buffer with `cells` (row-major, one byte per cell).
    fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError>;

    /// Run the rule over the input buffer into the output buffer.
    ///
    /// Blocks until the device reports completion. The input buffer is not
    /// modified.
    fn dispatch(&mut self) -> Result<(), ComputeError>;

    /// Copy the output buffer into `out`.
    fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError>;
}

impl<S: ComputeSession + ?Sized> ComputeSession for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn shape(&self) -> (usize, usize) {
        (**self).shape()
    }

    fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError> {
        (**self).write_input(cells)
    }

    fn dispatch(&mut self) -> Result<(), ComputeError> {
        (**self).dispatch()
    }

    fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError> {
        (**self).read_output(out)
    }
}

/// Check that a host slice matches a session's cell count.
pub(crate) fn check_len(shape: (usize, usize), len: usize) -> Result<(), ComputeError> {
    if shape.0 * shape.1 == len {
        Ok(())
    } else {
        Err(ComputeError::LengthMismatch {
            expected: shape.0 * shape.1,
            found: len,
        })
    }
}

// =============================================================================
// Backend selection
// =============================================================================

/// Which compute backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// Try the GPU, fall back to the CPU.
    #[default]
    Auto,
    /// GPU only; fail if no adapter is available.
    Gpu,
    /// Host CPU, data-parallel across threads.
    Cpu,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Auto => "auto",
            Backend::Gpu => "gpu",
            Backend::Cpu => "cpu",
        })
    }
}

/// Open a session sized for `grid` on the requested backend.
pub fn open_session(backend: Backend, grid: &Grid) -> Result<Box<dyn ComputeSession>, SetupError> {
    let session: Box<dyn ComputeSession> = match backend {
        Backend::Cpu => Box::new(CpuSession::new(grid.width(), grid.height())),
        Backend::Gpu => open_gpu(grid)?,
        Backend::Auto => match open_gpu(grid) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "GPU unavailable, falling back to CPU");
                Box::new(CpuSession::new(grid.width(), grid.height()))
            }
        },
    };
    tracing::info!(backend = %backend, device = %session.describe(), "compute session ready");
    Ok(session)
}

#[cfg(feature = "gpu")]
fn open_gpu(grid: &Grid) -> Result<Box<dyn ComputeSession>, SetupError> {
    Ok(Box::new(GpuSession::open(grid.width(), grid.height())?))
}

#[cfg(not(feature = "gpu"))]
fn open_gpu(_grid: &Grid) -> Result<Box<dyn ComputeSession>, SetupError> {
    Err(SetupError::GpuDisabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_backend_opens() {
        let grid = Grid::new(4, 4);
        let session = open_session(Backend::Cpu, &grid).unwrap();
        assert_eq!(session.shape(), (4, 4));
    }

    #[test]
    fn test_auto_always_yields_a_session() {
        let grid = Grid::new(3, 2);
        let session = open_session(Backend::Auto, &grid).unwrap();
        assert_eq!(session.shape(), (3, 2));
    }

    #[test]
    fn test_check_len() {
        assert!(check_len((3, 2), 6).is_ok());
        assert!(matches!(
            check_len((3, 2), 5),
            Err(ComputeError::LengthMismatch { expected: 6, found: 5 })
        ));
    }
}
