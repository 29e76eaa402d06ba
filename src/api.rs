//! Transport-agnostic request/response contract.
//!
//! A request carries the grid as rows of one-letter cells plus an operator
//! token; a response carries either the assignment and the elapsed time in
//! milliseconds, or an error message with its code.

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::errors::SolveError;
use crate::permutations::CandidateSource;
use crate::puzzle::{Operator, Puzzle};
use crate::solver::{Solver, SolverConfig};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolveRequest {
    pub puzzle: Vec<Vec<String>>,
    pub operator: String,
    /// Solver settings for this request; the caller's defaults apply when absent.
    #[serde(default)]
    pub config: Option<SolverConfig>,
}

impl SolveRequest {
    /// Validates the operator, then the grid. Nothing is searched.
    pub fn parse(&self) -> Result<(Puzzle, Operator), SolveError> {
        let operator = self.operator.parse()?;
        let puzzle = Puzzle::new(&self.puzzle)?;
        Ok((puzzle, operator))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SolveResponse {
    Solved {
        solution: Assignment,
        /// Elapsed milliseconds.
        time: u64,
    },
    Failed {
        error: String,
        code: &'static str,
    },
}

impl SolveResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveResponse::Solved { .. })
    }

    /// HTTP-style status for transports that want one.
    pub fn status(&self) -> u16 {
        if self.is_success() {
            200
        } else {
            400
        }
    }
}

impl From<SolveError> for SolveResponse {
    fn from(err: SolveError) -> Self {
        SolveResponse::Failed {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

/// Answers `request` with `solver`.
pub fn respond<S: CandidateSource>(solver: &mut Solver<S>, request: &SolveRequest) -> SolveResponse {
    let result = request
        .parse()
        .and_then(|(puzzle, operator)| solver.solve(&puzzle, operator));
    match result {
        Ok(solution) => SolveResponse::Solved {
            solution: solution.assignment,
            time: u64::try_from(solution.elapsed.as_millis()).unwrap_or(u64::MAX),
        },
        Err(err) => err.into(),
    }
}

/// Answers a raw JSON request body. A body that does not deserialize is a
/// malformed puzzle. A `config` in the body replaces `defaults`.
pub fn respond_json(body: &str, defaults: &SolverConfig) -> SolveResponse {
    let request: SolveRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return SolveError::malformed(format!("invalid request: {e}")).into(),
    };
    let config = request.config.clone().unwrap_or_else(|| defaults.clone());
    respond(&mut Solver::new(config), &request)
}
