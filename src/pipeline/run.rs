//! Run loop - N generations at a fixed pace.
//!
//! ```text
//! Idle ──run()──→ Running ──┬──→ Completed   (all generations shown)
//!                           ├──→ Cancelled   (token observed)
//!                           └──→ Failed      (compute or display error)
//! ```
//!
//! Per generation, strictly in this order:
//!
//! 1. `advance()`: dispatch and wait for the result
//! 2. check the cancel token; if set, stop without drawing the result
//! 3. render the result
//! 4. sleep for the frame delay
//! 5. `commit()` the result as the new current generation
//!
//! Whatever the outcome, the renderer's `finish()` runs before `run` returns,
//! so the cursor is always restored.

use std::thread;
use std::time::Duration;

use super::cancel::CancelToken;
use super::step::StepCoordinator;
use crate::compute::ComputeSession;
use crate::error::RunError;
use crate::renderer::{DisplaySurface, FrameRenderer};

/// Where the run loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Generations drawn on the surface.
    pub rendered: u64,
}

/// Ties a step coordinator, a frame renderer and a cancel token together.
#[derive(Debug)]
pub struct RunLoop<C, S> {
    coordinator: StepCoordinator<C>,
    renderer: FrameRenderer<S>,
    cancel: CancelToken,
    state: RunState,
    rendered: u64,
}

impl<C: ComputeSession, S: DisplaySurface> RunLoop<C, S> {
    pub fn new(coordinator: StepCoordinator<C>, surface: S, cancel: CancelToken) -> Self {
        let (width, height) = (coordinator.current().width(), coordinator.current().height());
        Self {
            coordinator,
            renderer: FrameRenderer::new(surface, width, height),
            cancel,
            state: RunState::Idle,
            rendered: 0,
        }
    }

    /// Show up to `generations` generations, `delay` apart.
    ///
    /// A run loop runs once; later calls return [`RunError::AlreadyRan`].
    pub fn run(&mut self, generations: u64, delay: Duration) -> Result<RunReport, RunError> {
        if self.state != RunState::Idle {
            return Err(RunError::AlreadyRan);
        }
        self.state = RunState::Running;
        tracing::info!(generations, delay_us = delay.as_micros() as u64, "run started");

        let result = self
            .renderer
            .begin()
            .map_err(RunError::from)
            .and_then(|_| self.drive(generations, delay));
        let teardown = self.renderer.finish().map_err(RunError::from);

        let outcome = match (result, teardown) {
            (Ok(outcome), Ok(())) => outcome,
            (Err(err), _) | (Ok(_), Err(err)) => {
                self.state = RunState::Failed;
                tracing::error!(error = %err, rendered = self.rendered, "run failed");
                return Err(err);
            }
        };

        self.state = match outcome {
            RunOutcome::Completed => RunState::Completed,
            RunOutcome::Cancelled => RunState::Cancelled,
        };
        tracing::info!(?outcome, rendered = self.rendered, "run finished");
        Ok(RunReport {
            outcome,
            rendered: self.rendered,
        })
    }

    fn drive(&mut self, generations: u64, delay: Duration) -> Result<RunOutcome, RunError> {
        for generation in 1..=generations {
            let snapshot = self.coordinator.advance()?;

            if self.cancel.is_cancelled() {
                tracing::info!(generation, "cancellation observed, discarding generation");
                return Ok(RunOutcome::Cancelled);
            }

            self.renderer.render(&snapshot, generation)?;
            self.rendered += 1;
            tracing::debug!(generation, population = snapshot.population(), "rendered");

            thread::sleep(delay);
            self.coordinator.commit(snapshot)?;
        }
        Ok(RunOutcome::Completed)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn coordinator(&self) -> &StepCoordinator<C> {
        &self.coordinator
    }

    pub fn surface(&self) -> &S {
        self.renderer.surface()
    }

    pub fn into_surface(self) -> S {
        self.renderer.into_surface()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CpuSession;
    use crate::error::ComputeError;
    use crate::grid::Grid;
    use crate::renderer::CaptureSurface;

    /// CPU session that fails one chosen dispatch or upload (1-based).
    struct Flaky {
        inner: CpuSession,
        fail_dispatch: Option<usize>,
        fail_upload: Option<usize>,
        dispatches: usize,
        uploads: usize,
    }

    impl Flaky {
        fn new(width: usize, height: usize) -> Self {
            Self {
                inner: CpuSession::new(width, height),
                fail_dispatch: None,
                fail_upload: None,
                dispatches: 0,
                uploads: 0,
            }
        }
    }

    impl ComputeSession for Flaky {
        fn describe(&self) -> String {
            "flaky".into()
        }
        fn shape(&self) -> (usize, usize) {
            self.inner.shape()
        }
        fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError> {
            self.uploads += 1;
            if self.fail_upload == Some(self.uploads) {
                return Err(ComputeError::Upload("device lost".into()));
            }
            self.inner.write_input(cells)
        }
        fn dispatch(&mut self) -> Result<(), ComputeError> {
            self.dispatches += 1;
            if self.fail_dispatch == Some(self.dispatches) {
                return Err(ComputeError::Dispatch("device lost".into()));
            }
            self.inner.dispatch()
        }
        fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError> {
            self.inner.read_output(out)
        }
    }

    fn flaky_loop(session: Flaky) -> RunLoop<Flaky, CaptureSurface> {
        let grid = Grid::with_live(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let coordinator = StepCoordinator::new(session, grid).unwrap();
        RunLoop::new(coordinator, CaptureSurface::new(40, 20), CancelToken::new())
    }

    fn blinker_loop(cancel: CancelToken) -> RunLoop<CpuSession, CaptureSurface> {
        let grid = Grid::with_live(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let coordinator = StepCoordinator::new(CpuSession::new(5, 5), grid).unwrap();
        RunLoop::new(coordinator, CaptureSurface::new(40, 20), cancel)
    }

    #[test]
    fn test_completes_all_generations() {
        let mut run = blinker_loop(CancelToken::new());
        let report = run.run(4, Duration::from_micros(1)).unwrap();
        assert_eq!(report, RunReport { outcome: RunOutcome::Completed, rendered: 4 });
        assert_eq!(run.state(), RunState::Completed);
        assert_eq!(run.surface().frames().len(), 4);
        assert!(run.surface().cursor_visible());
        assert!(run.surface().last_frame().unwrap().contains("Generation 4"));
    }

    #[test]
    fn test_cancel_before_first_render() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut run = blinker_loop(cancel);
        let report = run.run(10, Duration::from_micros(1)).unwrap();
        assert_eq!(report.outcome, RunOutcome::Cancelled);
        assert_eq!(report.rendered, 0);
        assert_eq!(run.state(), RunState::Cancelled);
        assert!(run.surface().frames().is_empty());
        assert!(run.surface().cursor_visible());
    }

    #[test]
    fn test_runs_once() {
        let mut run = blinker_loop(CancelToken::new());
        run.run(1, Duration::from_micros(1)).unwrap();
        assert!(matches!(
            run.run(1, Duration::from_micros(1)),
            Err(RunError::AlreadyRan)
        ));
    }

    #[test]
    fn test_display_failure_restores_cursor() {
        let grid = Grid::with_live(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        let coordinator = StepCoordinator::new(CpuSession::new(5, 5), grid).unwrap();
        let surface = CaptureSurface::new(40, 20).fail_on_frame(3);
        let mut run = RunLoop::new(coordinator, surface, CancelToken::new());

        let err = run.run(10, Duration::from_micros(1)).unwrap_err();
        assert!(matches!(err, RunError::Display(_)));
        assert_eq!(run.state(), RunState::Failed);
        assert_eq!(run.surface().frames().len(), 2);
        assert!(run.surface().cursor_visible());
    }

    #[test]
    fn test_dispatch_failure_mid_run() {
        for failing in 1..=4 {
            let mut session = Flaky::new(5, 5);
            session.fail_dispatch = Some(failing);
            let mut run = flaky_loop(session);

            let err = run.run(10, Duration::from_micros(1)).unwrap_err();
            assert!(matches!(err, RunError::Compute(ComputeError::Dispatch(_))));
            assert_eq!(run.state(), RunState::Failed);
            assert_eq!(run.surface().frames().len(), failing - 1);
            assert!(run.surface().cursor_visible(), "generation {failing}");
        }
    }

    #[test]
    fn test_commit_failure_mid_run() {
        let mut session = Flaky::new(5, 5);
        // Upload 1 is the initial grid; upload 3 commits generation 2.
        session.fail_upload = Some(3);
        let mut run = flaky_loop(session);

        let err = run.run(10, Duration::from_micros(1)).unwrap_err();
        assert!(matches!(err, RunError::Compute(ComputeError::Upload(_))));
        assert_eq!(run.state(), RunState::Failed);
        assert_eq!(run.surface().frames().len(), 2);
        // Generation 1 stays current.
        let horizontal = Grid::with_live(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        assert_eq!(run.coordinator().current(), &horizontal);

        let surface = run.into_surface();
        assert!(surface.cursor_visible());
    }

    #[test]
    fn test_current_tracks_last_rendered() {
        let mut run = blinker_loop(CancelToken::new());
        run.run(3, Duration::from_micros(1)).unwrap();
        // Odd number of steps: horizontal phase.
        let horizontal = Grid::with_live(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        assert_eq!(run.coordinator().current(), &horizontal);
    }
}
