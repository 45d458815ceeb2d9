//! Generation pipeline - the engine behind the animation.
//!
//! Strictly sequential, one generation at a time:
//!
//! ```text
//! RunLoop ──→ StepCoordinator::advance ──→ ComputeSession (dispatch, wait, read back)
//!    │                                            │
//!    │  ←────────────── snapshot ─────────────────┘
//!    │
//!    ├──→ CancelToken?  (set: stop, snapshot discarded)
//!    ├──→ FrameRenderer::render(snapshot)
//!    ├──→ sleep(delay)
//!    └──→ StepCoordinator::commit(snapshot) ──→ next generation
//! ```
//!
//! Parallelism exists only inside a dispatch. The host side has one thread
//! of control, so the buffers need no locks.

pub mod cancel;
pub mod run;
pub mod step;

pub use cancel::{install_interrupt_handler, CancelToken};
pub use run::{RunLoop, RunOutcome, RunReport, RunState};
pub use step::StepCoordinator;
