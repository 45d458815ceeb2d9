//! Step coordinator - one generation at a time.
//!
//! Owns the authoritative grid and the compute session holding its device
//! copy. A generation is two calls:
//!
//! ```text
//! advance()          dispatch ─→ wait for device ─→ read back ─→ snapshot
//!   (caller renders the snapshot)
//! commit(snapshot)   snapshot ─→ session input, snapshot ─→ current
//! ```
//!
//! Nothing reaches the caller until the device has finished, so a snapshot is
//! always a whole generation. After `commit`, [`StepCoordinator::current`]
//! equals the committed snapshot and the next `advance` starts from it.

use crate::compute::ComputeSession;
use crate::error::ComputeError;
use crate::grid::Grid;

/// Drives a [`ComputeSession`] and owns the current generation.
#[derive(Debug)]
pub struct StepCoordinator<S> {
    session: S,
    current: Grid,
}

impl<S: ComputeSession> StepCoordinator<S> {
    /// Load `initial` into `session` and make it the current generation.
    pub fn new(mut session: S, initial: Grid) -> Result<Self, ComputeError> {
        let shape = session.shape();
        if shape != (initial.width(), initial.height()) {
            return Err(ComputeError::ShapeMismatch {
                expected: shape,
                found: (initial.width(), initial.height()),
            });
        }
        session.write_input(initial.cells())?;
        Ok(Self {
            session,
            current: initial,
        })
    }

    /// Compute the generation after [`current`](Self::current).
    ///
    /// Blocks until the result is in host memory. The current generation is
    /// unchanged; call [`commit`](Self::commit) to promote the snapshot.
    pub fn advance(&mut self) -> Result<Grid, ComputeError> {
        self.session.dispatch()?;
        let mut snapshot = Grid::new(self.current.width(), self.current.height());
        self.session.read_output(snapshot.cells_mut())?;
        Ok(snapshot)
    }

    /// Promote `snapshot` to the current generation.
    ///
    /// On error the current generation is left as it was.
    pub fn commit(&mut self, snapshot: Grid) -> Result<(), ComputeError> {
        if !snapshot.same_shape(&self.current) {
            return Err(ComputeError::ShapeMismatch {
                expected: (self.current.width(), self.current.height()),
                found: (snapshot.width(), snapshot.height()),
            });
        }
        self.session.write_input(snapshot.cells())?;
        self.current = snapshot;
        Ok(())
    }

    /// The authoritative generation.
    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::CpuSession;

    fn glider() -> Grid {
        Grid::with_live(8, 8, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)])
    }

    /// Session that counts calls and can be told to fail.
    struct Scripted {
        inner: CpuSession,
        fail_dispatch_at: Option<usize>,
        fail_upload: bool,
        dispatches: usize,
    }

    impl ComputeSession for Scripted {
        fn describe(&self) -> String {
            "scripted".into()
        }
        fn shape(&self) -> (usize, usize) {
            self.inner.shape()
        }
        fn write_input(&mut self, cells: &[u8]) -> Result<(), ComputeError> {
            if self.fail_upload {
                return Err(ComputeError::Upload("scripted".into()));
            }
            self.inner.write_input(cells)
        }
        fn dispatch(&mut self) -> Result<(), ComputeError> {
            self.dispatches += 1;
            if self.fail_dispatch_at == Some(self.dispatches) {
                return Err(ComputeError::Dispatch("scripted".into()));
            }
            self.inner.dispatch()
        }
        fn read_output(&mut self, out: &mut [u8]) -> Result<(), ComputeError> {
            self.inner.read_output(out)
        }
    }

    #[test]
    fn test_commit_makes_snapshot_current() {
        let mut coord = StepCoordinator::new(CpuSession::new(8, 8), glider()).unwrap();
        for _ in 0..10 {
            let snapshot = coord.advance().unwrap();
            let expected = snapshot.clone();
            coord.commit(snapshot).unwrap();
            assert_eq!(coord.current(), &expected);
        }
    }

    #[test]
    fn test_advance_does_not_move_current() {
        let mut coord = StepCoordinator::new(CpuSession::new(8, 8), glider()).unwrap();
        let a = coord.advance().unwrap();
        let b = coord.advance().unwrap();
        assert_eq!(a, b);
        assert_eq!(coord.current(), &glider());
    }

    #[test]
    fn test_glider_returns_shifted_after_four() {
        let mut coord = StepCoordinator::new(CpuSession::new(8, 8), glider()).unwrap();
        for _ in 0..4 {
            let snapshot = coord.advance().unwrap();
            coord.commit(snapshot).unwrap();
        }
        let shifted = Grid::with_live(8, 8, &[(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)]);
        assert_eq!(coord.current(), &shifted);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        assert!(matches!(
            StepCoordinator::new(CpuSession::new(4, 4), Grid::new(5, 4)),
            Err(ComputeError::ShapeMismatch { .. })
        ));

        let mut coord = StepCoordinator::new(CpuSession::new(4, 4), Grid::new(4, 4)).unwrap();
        assert!(coord.commit(Grid::new(4, 5)).is_err());
        assert_eq!(coord.current(), &Grid::new(4, 4));
    }

    #[test]
    fn test_dispatch_failure_surfaces() {
        let session = Scripted {
            inner: CpuSession::new(8, 8),
            fail_dispatch_at: Some(2),
            fail_upload: false,
            dispatches: 0,
        };
        let mut coord = StepCoordinator::new(session, glider()).unwrap();
        let first = coord.advance().unwrap();
        coord.commit(first.clone()).unwrap();
        assert!(matches!(coord.advance(), Err(ComputeError::Dispatch(_))));
        assert_eq!(coord.session().dispatches, 2);
        assert_eq!(coord.current(), &first);
    }

    #[test]
    fn test_failed_commit_keeps_current() {
        let mut coord = StepCoordinator::new(
            Scripted {
                inner: CpuSession::new(8, 8),
                fail_dispatch_at: None,
                fail_upload: false,
                dispatches: 0,
            },
            glider(),
        )
        .unwrap();
        let snapshot = coord.advance().unwrap();
        coord.session.fail_upload = true;
        assert!(matches!(coord.commit(snapshot), Err(ComputeError::Upload(_))));
        assert_eq!(coord.current(), &glider());
    }
}
