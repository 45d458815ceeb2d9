//! Application wiring: map → session → run loop.

use crate::compute::open_session;
use crate::config::RunConfig;
use crate::error::{Error, RunError};
use crate::map::load_map;
use crate::pipeline::{CancelToken, RunLoop, RunReport, StepCoordinator};
use crate::renderer::DisplaySurface;

/// Load the map, acquire a compute session and run the animation on `surface`.
///
/// Configuration and setup errors are returned before anything is drawn.
/// The session is released when this function returns, on every path.
pub fn run<S: DisplaySurface>(
    config: &RunConfig,
    surface: S,
    cancel: CancelToken,
) -> Result<RunReport, Error> {
    let grid = load_map(&config.map_path)?;
    let session = open_session(config.backend, &grid)?;
    let coordinator = StepCoordinator::new(session, grid).map_err(RunError::from)?;

    let mut run_loop = RunLoop::new(coordinator, surface, cancel);
    Ok(run_loop.run(config.generations, config.delay)?)
}
