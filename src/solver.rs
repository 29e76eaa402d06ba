//! The search driver.
//!
//! A solve runs in linear phases: validate the input, generate candidates,
//! search, and stop at the first valid candidate or at exhaustion. Failures
//! are returned as [`SolveError`], never panics.
//!
//! # Strategies
//!
//! - [`Strategy::Sequential`] walks the candidate stream in order.
//! - [`Strategy::Parallel`] splits the stream by first digit into ten
//!   branches. Branches are claimed in ascending order and the lowest branch
//!   that finds a solution wins, so both strategies report the same
//!   assignment for the same puzzle.
//!
//! Cancellation and the deadline are checked between batches of
//! `batch_size` candidates, not after every candidate.
//!
//! # Example
//!
//! ```
//! use cryptarithm_solver::puzzle::{Operator, Puzzle};
//! use cryptarithm_solver::solver::{Solver, SolverConfig};
//!
//! let puzzle = Puzzle::from_words(["A", "A", "B"])?;
//! let mut solver = Solver::new(SolverConfig::default());
//! let solution = solver.solve(&puzzle, Operator::Add)?;
//! assert!(puzzle.holds(Operator::Add, &solution.assignment));
//! # Ok::<(), cryptarithm_solver::errors::SolveError>(())
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::cache::{Outcome, SolutionCache, ValidationMemo};
use crate::errors::SolveError;
use crate::permutations::{CandidateSource, DigitPermutations, Digits, DIGITS};
use crate::puzzle::{Operator, Puzzle, MAX_LETTERS};

/// Deadline the CLI applies unless told otherwise. Library solves have none
/// by default, so exhaustion never depends on machine speed.
pub const DEFAULT_TIMEOUT_MS: u64 = 7_000;

/// How the candidate space is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Sequential,
    Parallel,
}

/// Solver settings. Every field has a default, so a partial JSON object
/// deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Worker threads for [`Strategy::Parallel`].
    pub workers: usize,
    /// Deadline for one solve, in milliseconds. `None` means no deadline.
    pub timeout_ms: Option<u64>,
    /// Candidates validated between cancellation and deadline checks.
    pub batch_size: usize,
    /// Bound on the validation memo. Zero disables it.
    pub memo_capacity: usize,
    /// Bound on the solution cache. Zero disables it.
    pub solution_cache_capacity: usize,
    pub solution_cache_ttl_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            strategy: Strategy::Sequential,
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            timeout_ms: None,
            batch_size: 4096,
            memo_capacity: 4096,
            solution_cache_capacity: 1024,
            solution_cache_ttl_secs: 120,
        }
    }
}

impl SolverConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    // one worker per first digit at most
    fn worker_count(&self) -> usize {
        self.workers.clamp(1, usize::from(DIGITS))
    }

    fn batch(&self) -> u64 {
        self.batch_size.max(1) as u64
    }
}

/// Shared flag a caller flips to abandon a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Wall-clock budget for one solve.
#[derive(Debug, Clone, Copy)]
struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    /// The error to stop with, if the search should stop now.
    fn interruption(&self, cancel: &CancelToken) -> Option<SolveError> {
        if cancel.is_cancelled() {
            Some(SolveError::Cancelled)
        } else if self.expired() {
            Some(SolveError::TimedOut { elapsed: self.elapsed() })
        } else {
            None
        }
    }
}

/// A satisfying assignment and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub assignment: Assignment,
    pub elapsed: Duration,
    /// Candidates validated before the search stopped. With the parallel
    /// strategy this includes work done in branches that lost.
    pub candidates: u64,
    /// True when the outcome came from the solution cache.
    pub cached: bool,
}

/// Drives searches and owns the caches that outlive a single solve.
pub struct Solver<S = DigitPermutations> {
    config: SolverConfig,
    source: S,
    memo: ValidationMemo,
    solutions: SolutionCache,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver::with_source(config, DigitPermutations)
    }
}

impl<S: CandidateSource> Solver<S> {
    /// A solver that draws candidates from `source` instead of the default
    /// lexicographic permutations.
    pub fn with_source(config: SolverConfig, source: S) -> Self {
        Solver {
            memo: ValidationMemo::new(config.memo_capacity),
            solutions: SolutionCache::new(
                config.solution_cache_capacity,
                Duration::from_secs(config.solution_cache_ttl_secs),
            ),
            config,
            source,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn solve(&mut self, puzzle: &Puzzle, operator: Operator) -> Result<Solution, SolveError> {
        self.solve_cancellable(puzzle, operator, &CancelToken::new())
    }

    /// Like [`Solver::solve`], stopping with [`SolveError::Cancelled`] once
    /// `cancel` is flipped.
    pub fn solve_cancellable(
        &mut self,
        puzzle: &Puzzle,
        operator: Operator,
        cancel: &CancelToken,
    ) -> Result<Solution, SolveError> {
        let budget = TimeBudget::new(self.config.timeout());

        let count = puzzle.letters().len();
        if count > MAX_LETTERS {
            return Err(SolveError::TooManyLetters { count });
        }

        let (outcome, cached) = match self.solutions.get(puzzle, operator) {
            Some(outcome) => {
                debug!("solution cache hit for {puzzle} with {operator}");
                (outcome, true)
            }
            None => {
                debug!(
                    "searching {puzzle} with {operator}: {count} letters, {:?} strategy",
                    self.config.strategy
                );
                let outcome = match self.config.strategy {
                    Strategy::Sequential => self.search_sequential(puzzle, operator, &budget, cancel),
                    Strategy::Parallel => search_parallel(
                        &self.source,
                        &self.config,
                        puzzle,
                        operator,
                        &budget,
                        cancel,
                    ),
                }
                .inspect_err(|e| warn!("search of {puzzle} stopped: {e}"))?;
                self.solutions.insert(puzzle, operator, outcome.clone());
                (outcome, false)
            }
        };

        match outcome {
            Outcome::Solved { assignment, candidates } => {
                info!("solved {puzzle} with {operator}: {assignment} after {candidates} candidates");
                Ok(Solution {
                    assignment,
                    elapsed: budget.elapsed(),
                    candidates,
                    cached,
                })
            }
            Outcome::Exhausted { candidates } => {
                info!("no solution for {puzzle} with {operator} in {candidates} candidates");
                Err(SolveError::NoSolutionFound)
            }
        }
    }

    fn search_sequential(
        &mut self,
        puzzle: &Puzzle,
        operator: Operator,
        budget: &TimeBudget,
        cancel: &CancelToken,
    ) -> Result<Outcome, SolveError> {
        let batch = self.config.batch();
        self.memo.begin_session(puzzle, operator);

        let mut examined = 0u64;
        for digits in self.source.candidates(puzzle.letters().len()) {
            if examined % batch == 0 {
                if let Some(stop) = budget.interruption(cancel) {
                    return Err(stop);
                }
            }
            examined += 1;
            if self.memo.check(&digits, || puzzle.check(operator, &digits)) {
                return Ok(Outcome::Solved {
                    assignment: Assignment::from_digits(puzzle.letters(), &digits),
                    candidates: examined,
                });
            }
        }
        debug!("candidate space exhausted after {examined} candidates");
        Ok(Outcome::Exhausted { candidates: examined })
    }
}

enum BranchResult {
    Found { branch: usize, digits: Digits },
    Exhausted,
    Abandoned,
    Interrupted { branch: usize, error: SolveError },
}

/// State shared by the workers of one parallel search.
struct Shared<'a> {
    puzzle: &'a Puzzle,
    operator: Operator,
    budget: &'a TimeBudget,
    cancel: &'a CancelToken,
    batch: u64,
    next_branch: AtomicUsize,
    // lowest branch known to hold a solution
    best: AtomicUsize,
    examined: AtomicU64,
}

fn search_parallel<S: CandidateSource>(
    source: &S,
    config: &SolverConfig,
    puzzle: &Puzzle,
    operator: Operator,
    budget: &TimeBudget,
    cancel: &CancelToken,
) -> Result<Outcome, SolveError> {
    let shared = Shared {
        puzzle,
        operator,
        budget,
        cancel,
        batch: config.batch(),
        next_branch: AtomicUsize::new(0),
        best: AtomicUsize::new(usize::MAX),
        examined: AtomicU64::new(0),
    };
    let (tx, rx) = crossbeam_channel::unbounded();

    thread::scope(|scope| {
        for _ in 0..config.worker_count() {
            let tx = tx.clone();
            let shared = &shared;
            scope.spawn(move || run_worker(source, shared, &tx));
        }
    });
    drop(tx);

    let mut winner: Option<(usize, Digits)> = None;
    let mut interrupted: Option<(usize, SolveError)> = None;
    for result in rx.try_iter() {
        match result {
            BranchResult::Found { branch, digits } => {
                if winner.as_ref().map_or(true, |(b, _)| branch < *b) {
                    winner = Some((branch, digits));
                }
            }
            BranchResult::Interrupted { branch, error } => {
                if interrupted.as_ref().map_or(true, |(b, _)| branch < *b) {
                    interrupted = Some((branch, error));
                }
            }
            BranchResult::Exhausted | BranchResult::Abandoned => {}
        }
    }

    let candidates = shared.examined.load(Ordering::Relaxed);
    match (winner, interrupted) {
        // a lower branch was cut short, so the winner may not be the first
        (Some((won, _)), Some((cut, error))) if cut < won => Err(error),
        (Some((_, digits)), _) => Ok(Outcome::Solved {
            assignment: Assignment::from_digits(puzzle.letters(), &digits),
            candidates,
        }),
        (None, Some((_, error))) => Err(error),
        (None, None) => Ok(Outcome::Exhausted { candidates }),
    }
}

fn run_worker<S: CandidateSource>(source: &S, shared: &Shared<'_>, tx: &Sender<BranchResult>) {
    loop {
        let branch = shared.next_branch.fetch_add(1, Ordering::SeqCst);
        if branch >= usize::from(DIGITS) || branch > shared.best.load(Ordering::SeqCst) {
            break;
        }
        let result = search_branch(source, shared, branch);
        tx.send(result).unwrap_or(());
    }
}

fn search_branch<S: CandidateSource>(source: &S, shared: &Shared<'_>, branch: usize) -> BranchResult {
    let len = shared.puzzle.letters().len();
    let first = branch as u8;

    let mut examined = 0u64;
    let result = 'search: {
        for digits in source.branch(len, first) {
            if examined % shared.batch == 0 {
                if let Some(error) = shared.budget.interruption(shared.cancel) {
                    break 'search BranchResult::Interrupted { branch, error };
                }
                if shared.best.load(Ordering::SeqCst) < branch {
                    break 'search BranchResult::Abandoned;
                }
            }
            examined += 1;
            if shared.puzzle.check(shared.operator, &digits) {
                shared.best.fetch_min(branch, Ordering::SeqCst);
                break 'search BranchResult::Found { branch, digits };
            }
        }
        BranchResult::Exhausted
    };
    shared.examined.fetch_add(examined, Ordering::Relaxed);
    debug!("branch {branch}: {examined} candidates");
    result
}

/// Solves with a fresh single-use [`Solver`]: no deadline, no caches.
///
/// Returns the first solution in lexicographic candidate order, or
/// [`SolveError::NoSolutionFound`] once every candidate has been tried.
pub fn solve(puzzle: &Puzzle, operator: Operator) -> Result<Solution, SolveError> {
    let config = SolverConfig {
        timeout_ms: None,
        memo_capacity: 0,
        solution_cache_capacity: 0,
        ..SolverConfig::default()
    };
    Solver::new(config).solve(puzzle, operator)
}
