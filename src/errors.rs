//! Error types returned by the solver.
//!
//! # Error Codes
//!
//! - C001: `MalformedPuzzle` (wrong row count, empty row, bad token)
//! - C002: `UnsupportedOperator` (operator not one of `+ - * /`)
//! - C003: `TooManyLetters` (more than ten distinct letters)
//! - C004: `NoSolutionFound` (candidate space exhausted)
//! - C005: `Cancelled` (caller abandoned the search)
//! - C006: `TimedOut` (deadline passed before a solution was found)

use std::time::Duration;

/// Every way a solve can fail. Failures are always returned, never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error("Malformed puzzle: {reason}")]
    MalformedPuzzle { reason: String },

    #[error("Unsupported operator: \"{token}\"")]
    UnsupportedOperator { token: String },

    #[error("Too many unique letters for a valid solution ({count} > 10)")]
    TooManyLetters { count: usize },

    #[error("No valid solution found")]
    NoSolutionFound,

    #[error("Search cancelled")]
    Cancelled,

    #[error("Search timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },
}

impl SolveError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        SolveError::MalformedPuzzle { reason: reason.into() }
    }

    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SolveError::MalformedPuzzle { .. } => "C001",
            SolveError::UnsupportedOperator { .. } => "C002",
            SolveError::TooManyLetters { .. } => "C003",
            SolveError::NoSolutionFound => "C004",
            SolveError::Cancelled => "C005",
            SolveError::TimedOut { .. } => "C006",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            SolveError::MalformedPuzzle { .. } => {
                Some("A puzzle is exactly three rows of single letters, e.g. SEND MORE MONEY")
            }
            SolveError::UnsupportedOperator { .. } => Some("Use one of: + - * /"),
            SolveError::TooManyLetters { .. } => {
                Some("Each letter needs its own digit, so at most 10 distinct letters fit")
            }
            SolveError::TimedOut { .. } => Some("Raise the timeout or try the parallel strategy"),
            SolveError::NoSolutionFound | SolveError::Cancelled => None,
        }
    }

    /// Formats the error with its code and help text, for terminal output.
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{self} ({})\n  help: {help}", self.code()),
            None => format!("{self} ({})", self.code()),
        }
    }
}
