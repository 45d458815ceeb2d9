//! Error types, one enum per failure class.
//!
//! - [`MapError`]: the initial map cannot be used (configuration)
//! - [`SetupError`]: no compute session could be acquired
//! - [`ComputeError`]: a dispatch, readback or commit failed mid-run
//! - [`RunError`]: anything that stops the run loop
//!
//! [`Error`] wraps all of them for the binary.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("could not open map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map contains no rows")]
    Empty,
    #[error("inconsistent row length in map: row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("no GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    Device(String),
    #[error("compute kernel failed to build:\n{0}")]
    ShaderBuild(String),
    #[error("grid of {cells} cells needs {bytes} bytes, device allows {limit}")]
    GridTooLarge { cells: usize, bytes: u64, limit: u64 },
    #[error("grid of {width}x{height} needs {workgroups} workgroups along one axis, device allows {limit}")]
    TooManyWorkgroups {
        width: usize,
        height: usize,
        workgroups: usize,
        limit: u32,
    },
    #[error("GPU support not compiled in (enable the `gpu` feature)")]
    GpuDisabled,
}

#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("kernel dispatch failed: {0}")]
    Dispatch(String),
    #[error("reading back result failed: {0}")]
    Readback(String),
    #[error("writing input buffer failed: {0}")]
    Upload(String),
    #[error("grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("buffer holds {found} cells, session expects {expected}")]
    LengthMismatch { expected: usize, found: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Compute(#[from] ComputeError),
    #[error("display write failed: {0}")]
    Display(#[from] io::Error),
    #[error("run loop already used")]
    AlreadyRan,
}

/// Top-level error returned by [`crate::app::run`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Run(#[from] RunError),
}
