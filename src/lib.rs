//! Cryptarithm solving: find an injective letter→digit mapping that makes
//! `row0 <op> row1 == row2` hold for a three-row letter grid.
//!
//! The search enumerates digit permutations in a fixed order and returns the
//! first satisfying assignment. Leading zeros are allowed.

pub mod api;
pub mod assignment;
pub mod cache;
pub mod errors;
pub mod logging;
pub mod permutations;
pub mod puzzle;
pub mod solver;
pub mod worker;

pub use assignment::Assignment;
pub use errors::SolveError;
pub use puzzle::{parse_equation, Operator, Puzzle};
pub use solver::{solve, CancelToken, Solution, Solver, SolverConfig, Strategy};
