use std::io::Read;
use std::process::ExitCode;

use clap::Parser;

use cryptarithm_solver::api;
use cryptarithm_solver::puzzle::{parse_equation, Operator, Puzzle};
use cryptarithm_solver::solver::{Solver, SolverConfig, Strategy, DEFAULT_TIMEOUT_MS};
use cryptarithm_solver::SolveError;

/// Cryptarithm solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The three rows of the puzzle (e.g. SEND MORE MONEY)
    #[arg(num_args = 3, required_unless_present_any = ["equation", "json"])]
    rows: Vec<String>,

    /// Operator between the first two rows: + - * /
    #[arg(short, long, default_value = "+", allow_hyphen_values = true)]
    operator: String,

    /// The whole equation, e.g. "SEND + MORE = MONEY"
    #[arg(short, long, conflicts_with = "rows")]
    equation: Option<String>,

    /// Read a JSON request from stdin and write the JSON response
    #[arg(long, conflicts_with_all = ["rows", "equation"])]
    json: bool,

    /// Search with one thread per first digit
    #[arg(short, long)]
    parallel: bool,

    /// Worker threads for the parallel search
    #[arg(short, long)]
    workers: Option<usize>,

    /// Give up after this many milliseconds (0 for no limit)
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
}

impl Cli {
    fn config(&self) -> SolverConfig {
        let defaults = SolverConfig::default();
        SolverConfig {
            strategy: if self.parallel {
                Strategy::Parallel
            } else {
                Strategy::Sequential
            },
            workers: self.workers.unwrap_or(defaults.workers),
            timeout_ms: (self.timeout_ms > 0).then_some(self.timeout_ms),
            ..defaults
        }
    }

    fn puzzle(&self) -> Result<(Puzzle, Operator), SolveError> {
        if let Some(equation) = &self.equation {
            return parse_equation(equation);
        }
        let operator = self.operator.parse()?;
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.chars().map(String::from).collect())
            .collect();
        Ok((Puzzle::new(&cells)?, operator))
    }
}

/// Entry point of the CLI.
///
/// Delegates to [`try_main`] and prints any error before exiting with code 1.
fn main() -> ExitCode {
    cryptarithm_solver::logging::init_from_env();

    if let Err(e) = try_main() {
        if let Some(solve_err) = e.downcast_ref::<SolveError>() {
            eprintln!("Error: {}", solve_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    if cli.json {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        let response = api::respond_json(&body, &config);
        println!("{}", serde_json::to_string(&response)?);
        if !response.is_success() {
            anyhow::bail!("request failed with status {}", response.status());
        }
        return Ok(());
    }

    let (puzzle, operator) = cli.puzzle()?;
    let mut solver = Solver::new(config);
    log::debug!("solver config: {:?}", solver.config());
    let solution = solver.solve(&puzzle, operator)?;

    if let Some([lhs, rhs, result]) = puzzle.values(&solution.assignment) {
        println!("{lhs} {operator} {rhs} = {result}");
    }
    println!("{}", solution.assignment);
    println!(
        "Solved in {:.3}s after {} candidates",
        solution.elapsed.as_secs_f64(),
        solution.candidates
    );
    Ok(())
}
