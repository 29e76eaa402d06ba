//! End-to-end tests: grid in, assignment (or typed failure) out.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use cryptarithm_solver::api::{self, SolveRequest, SolveResponse};
use cryptarithm_solver::permutations::{falling_factorial, CandidateSource, DigitPermutations, Digits};
use cryptarithm_solver::worker;
use cryptarithm_solver::{
    parse_equation, Operator, Puzzle, SolveError, Solver, SolverConfig, Strategy,
};

/// Lexicographic permutations that record how often they were asked for and
/// how many tuples they produced.
#[derive(Default)]
struct Counting {
    inner: DigitPermutations,
    calls: AtomicUsize,
    yielded: AtomicU64,
}

impl CandidateSource for Counting {
    fn candidates(&self, len: usize) -> Box<dyn Iterator<Item = Digits> + '_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::new(self.inner.candidates(len).inspect(move |_| {
            self.yielded.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

fn config(strategy: Strategy) -> SolverConfig {
    SolverConfig {
        strategy,
        workers: 4,
        timeout_ms: None,
        memo_capacity: 0,
        ..SolverConfig::default()
    }
}

fn counting_solver() -> Solver<Counting> {
    Solver::with_source(config(Strategy::Sequential), Counting::default())
}

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

fn send_more_money() -> Puzzle {
    Puzzle::new(&grid(&[
        &["S", "E", "N", "D"],
        &["M", "O", "R", "E"],
        &["M", "O", "N", "E", "Y"],
    ]))
    .unwrap()
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn send_more_money_satisfies_the_sum() {
        let puzzle = send_more_money();
        let solution = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();

        assert_eq!(solution.assignment.len(), 8);
        assert!(solution.assignment.is_injective());
        let [send, more, money] = puzzle.values(&solution.assignment).unwrap();
        assert_eq!(send + more, money);
    }

    #[test]
    fn classical_send_more_money_mapping_is_accepted() {
        let puzzle = send_more_money();
        let classical = [
            ('S', 9),
            ('E', 5),
            ('N', 6),
            ('D', 7),
            ('M', 1),
            ('O', 0),
            ('R', 8),
            ('Y', 2),
        ]
        .into_iter()
        .collect();
        assert!(puzzle.holds(Operator::Add, &classical));
        assert_eq!(puzzle.values(&classical), Some([9567, 1085, 10652]));
    }

    #[test]
    fn two_letter_sum() {
        let puzzle = Puzzle::new(&grid(&[&["A"], &["A"], &["B"]])).unwrap();
        let solution = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        assert!(puzzle.holds(Operator::Add, &solution.assignment));
        assert_eq!(solution.assignment.get('A'), Some(1));
        assert_eq!(solution.assignment.get('B'), Some(2));
    }

    #[test]
    fn eleven_letters_fail_without_generating() {
        let puzzle = Puzzle::new(&grid(&[
            &["A", "B", "C", "D"],
            &["E", "F", "G", "H"],
            &["I", "J", "K"],
        ]))
        .unwrap();
        let mut solver = counting_solver();
        let err = solver.solve(&puzzle, Operator::Add).unwrap_err();

        assert_eq!(err, SolveError::TooManyLetters { count: 11 });
        assert_eq!(solver.source().calls.load(Ordering::SeqCst), 0);
        assert_eq!(solver.source().yielded.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsupported_operator_fails_without_generating() {
        assert_eq!(
            "%".parse::<Operator>(),
            Err(SolveError::UnsupportedOperator { token: "%".into() })
        );

        let request = SolveRequest {
            puzzle: grid(&[&["A"], &["A"], &["B"]]),
            operator: "%".to_string(),
            config: None,
        };
        let mut solver = counting_solver();
        let response = api::respond(&mut solver, &request);

        assert_eq!(
            response,
            SolveResponse::Failed {
                error: "Unsupported operator: \"%\"".to_string(),
                code: "C002",
            }
        );
        assert_eq!(solver.source().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subtraction_allows_zero_without_leading_digit_rule() {
        let puzzle = Puzzle::new(&grid(&[&["A"], &["B"], &["A"]])).unwrap();
        let solution = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Sub)
            .unwrap();
        assert_eq!(solution.assignment.get('B'), Some(0));
        assert!(puzzle.holds(Operator::Sub, &solution.assignment));
    }
}

#[cfg(test)]
mod exhaustion {
    use super::*;

    #[test]
    fn every_candidate_is_tried_before_giving_up() {
        for (words, letters) in [(["AB", "AB", "AB"], 2u64), (["ABC", "ABC", "ABC"], 3)] {
            let puzzle = Puzzle::from_words(words).unwrap();
            let mut solver = counting_solver();
            let err = solver.solve(&puzzle, Operator::Add).unwrap_err();

            assert_eq!(err, SolveError::NoSolutionFound);
            assert_eq!(solver.source().calls.load(Ordering::SeqCst), 1);
            assert_eq!(
                solver.source().yielded.load(Ordering::SeqCst),
                falling_factorial(10, letters)
            );
        }
    }

    #[test]
    fn parallel_search_also_exhausts() {
        let puzzle = Puzzle::from_words(["AB", "AB", "AB"]).unwrap();
        let err = Solver::new(config(Strategy::Parallel))
            .solve(&puzzle, Operator::Add)
            .unwrap_err();
        assert_eq!(err, SolveError::NoSolutionFound);
    }
}

#[cfg(test)]
mod determinism {
    use super::*;

    #[test]
    fn repeated_sequential_solves_agree() {
        let puzzle = Puzzle::from_words(["TO", "GO", "OUT"]).unwrap();
        let first = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        let second = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        assert_eq!(first.assignment, second.assignment);
        assert_eq!(first.candidates, second.candidates);
    }

    #[test]
    fn parallel_reports_the_lowest_order_solution() {
        let puzzle = send_more_money();
        let sequential = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        let parallel = Solver::new(config(Strategy::Parallel))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        assert_eq!(sequential.assignment, parallel.assignment);
    }
}

#[cfg(test)]
mod boundary {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn json_round_trip_for_send_more_money() {
        let body = json!({
            "puzzle": [["S","E","N","D"], ["M","O","R","E"], ["M","O","N","E","Y"]],
            "operator": "+",
            "config": { "timeout_ms": null, "memo_capacity": 0 }
        })
        .to_string();
        let response = api::respond_json(&body, &SolverConfig::default());
        assert!(response.is_success());

        let value: Value = serde_json::to_value(&response).unwrap();
        let solution = value["solution"].as_object().unwrap();
        assert_eq!(solution.len(), 8);
        let mapping = solution
            .iter()
            .map(|(letter, digit)| {
                let digit = digit.as_str().unwrap();
                assert_eq!(digit.len(), 1);
                (letter.chars().next().unwrap(), digit.parse::<u8>().unwrap())
            })
            .collect();
        assert!(send_more_money().holds(Operator::Add, &mapping));
    }

    #[test]
    fn equation_strings_solve_like_grids() {
        let (puzzle, operator) = parse_equation("TO + GO = OUT").unwrap();
        assert_eq!(puzzle, Puzzle::from_words(["TO", "GO", "OUT"]).unwrap());
        let solution = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, operator)
            .unwrap();
        assert!(puzzle.holds(operator, &solution.assignment));
    }

    #[test]
    fn background_solve_matches_foreground() {
        let puzzle = Puzzle::from_words(["TO", "GO", "OUT"]).unwrap();
        let foreground = Solver::new(config(Strategy::Sequential))
            .solve(&puzzle, Operator::Add)
            .unwrap();
        let background = worker::spawn_solve(puzzle, Operator::Add, config(Strategy::Sequential))
            .wait()
            .unwrap();
        assert_eq!(foreground.assignment, background.assignment);
    }

    #[test]
    fn multiplication_and_division() {
        for (equation, operator) in [("AB * C = DE", Operator::Mul), ("AB / C = D", Operator::Div)] {
            let (puzzle, parsed) = parse_equation(equation).unwrap();
            assert_eq!(parsed, operator);
            let solution = Solver::new(config(Strategy::Sequential))
                .solve(&puzzle, parsed)
                .unwrap();
            assert!(puzzle.holds(operator, &solution.assignment), "{equation}");
        }
    }
}
