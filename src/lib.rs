//! # spark-life
//!
//! A cellular automaton (B3/S23) stepped on the GPU and rendered live in the
//! terminal.
//!
//! ## Architecture
//!
//! ```text
//! map file ──→ Grid ──→ StepCoordinator ⇄ ComputeSession (wgpu | rayon)
//!                            │
//!                            ▼ snapshot
//!                       RunLoop ──→ FrameRenderer ──→ DisplaySurface ──→ terminal
//!                            ▲
//!                       CancelToken ←── SIGINT
//! ```
//!
//! ## Modules
//!
//! - [`grid`] - Cell grid, one generation
//! - [`map`] - Map file parsing
//! - [`compute`] - Transition rule and compute sessions
//! - [`pipeline`] - Step coordinator, run loop, cancellation
//! - [`renderer`] - Frame layout and display surfaces
//! - [`config`] - Command-line arguments
//! - [`app`] - Wiring for the binary

pub mod app;
pub mod compute;
pub mod config;
pub mod error;
pub mod grid;
pub mod map;
pub mod pipeline;
pub mod renderer;

pub use compute::{open_session, Backend, ComputeSession, CpuSession};
#[cfg(feature = "gpu")]
pub use compute::GpuSession;
pub use config::{Args, RunConfig};
pub use error::{ComputeError, Error, MapError, RunError, SetupError};
pub use grid::Grid;
pub use map::{load_map, parse_map};
pub use pipeline::{
    install_interrupt_handler, CancelToken, RunLoop, RunOutcome, RunReport, RunState,
    StepCoordinator,
};
pub use renderer::{CaptureSurface, DisplaySurface, FrameRenderer, TerminalSurface};
