//! Background solves: the search runs on its own thread and the caller
//! receives the result over a channel, so an interactive caller never blocks
//! on the search itself.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::warn;

use crate::errors::SolveError;
use crate::permutations::CandidateSource;
use crate::puzzle::{Operator, Puzzle};
use crate::solver::{CancelToken, Solution, Solver, SolverConfig};

pub type SolveResult = Result<Solution, SolveError>;

/// A solve running on a background thread.
pub struct SolveHandle {
    rx: Receiver<SolveResult>,
    cancel: CancelToken,
}

impl SolveHandle {
    /// Asks the search to stop at its next batch boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Blocks until the search finishes.
    pub fn wait(self) -> SolveResult {
        self.rx.recv().unwrap_or(Err(SolveError::Cancelled))
    }

    /// Blocks for at most `timeout`; on expiry the search is cancelled and
    /// [`SolveError::TimedOut`] returned.
    pub fn wait_timeout(self, timeout: Duration) -> SolveResult {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("abandoning background solve after {timeout:?}");
                self.cancel.cancel();
                Err(SolveError::TimedOut { elapsed: timeout })
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolveError::Cancelled),
        }
    }
}

/// Solves `puzzle` on a new thread with a fresh solver.
pub fn spawn_solve(puzzle: Puzzle, operator: Operator, config: SolverConfig) -> SolveHandle {
    spawn_with(Solver::new(config), puzzle, operator)
}

/// Solves `puzzle` on a new thread with `solver`, which is dropped when the
/// search ends.
pub fn spawn_with<S>(mut solver: Solver<S>, puzzle: Puzzle, operator: Operator) -> SolveHandle
where
    S: CandidateSource + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    let cancel = CancelToken::new();
    let token = cancel.clone();
    thread::spawn(move || {
        let result = solver.solve_cancellable(&puzzle, operator, &token);
        tx.send(result).unwrap_or_default();
    });
    SolveHandle { rx, cancel }
}
