//! Bounded caches owned by a [`Solver`](crate::solver::Solver).
//!
//! Both caches sit on `cached::SizedCache`, so neither grows past its
//! capacity no matter how many distinct puzzles a long-lived process sees.

use std::time::{Duration, Instant};

use cached::{Cached, SizedCache};

use crate::assignment::Assignment;
use crate::puzzle::{Operator, Puzzle};

/// Memo of candidate validity for one `(puzzle, operator)` session.
///
/// Entries are keyed by the packed digit tuple; together with the session
/// that is the full `(puzzle, operator, assignment)` triple. Starting a
/// session for a different puzzle or operator drops every entry.
pub struct ValidationMemo {
    session: Option<(Puzzle, Operator)>,
    cache: Option<SizedCache<u64, bool>>,
}

impl ValidationMemo {
    /// A `capacity` of zero disables memoization.
    pub fn new(capacity: usize) -> Self {
        ValidationMemo {
            session: None,
            cache: (capacity > 0).then(|| SizedCache::with_size(capacity)),
        }
    }

    pub fn begin_session(&mut self, puzzle: &Puzzle, operator: Operator) {
        let same = self
            .session
            .as_ref()
            .is_some_and(|(p, op)| p == puzzle && *op == operator);
        if !same {
            if let Some(cache) = self.cache.as_mut() {
                cache.cache_clear();
            }
            self.session = Some((puzzle.clone(), operator));
        }
    }

    /// Returns the memoized validity of `digits`, running `validate` on a miss.
    pub fn check(&mut self, digits: &[u8], validate: impl FnOnce() -> bool) -> bool {
        let Some(cache) = self.cache.as_mut() else {
            return validate();
        };
        let key = pack(digits);
        if let Some(&valid) = cache.cache_get(&key) {
            return valid;
        }
        let valid = validate();
        cache.cache_set(key, valid);
        valid
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.cache_size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.cache
            .as_ref()
            .and_then(|c| c.cache_hits())
            .unwrap_or_default()
    }
}

// Four bits per digit; at most ten digits.
fn pack(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0, |acc, &d| (acc << 4) | u64::from(d))
}

/// How a finished (not interrupted) search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved { assignment: Assignment, candidates: u64 },
    Exhausted { candidates: u64 },
}

/// Outcomes of earlier solves, bounded in size and expiring after `ttl`.
pub struct SolutionCache {
    cache: Option<SizedCache<(Puzzle, Operator), (Instant, Outcome)>>,
    ttl: Duration,
}

impl SolutionCache {
    /// A `capacity` of zero disables caching.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        SolutionCache {
            cache: (capacity > 0).then(|| SizedCache::with_size(capacity)),
            ttl,
        }
    }

    pub fn get(&mut self, puzzle: &Puzzle, operator: Operator) -> Option<Outcome> {
        let cache = self.cache.as_mut()?;
        let key = (puzzle.clone(), operator);
        let (stored, outcome) = cache.cache_get(&key)?.clone();
        if stored.elapsed() > self.ttl {
            cache.cache_remove(&key);
            return None;
        }
        Some(outcome)
    }

    pub fn insert(&mut self, puzzle: &Puzzle, operator: Operator, outcome: Outcome) {
        if let Some(cache) = self.cache.as_mut() {
            cache.cache_set((puzzle.clone(), operator), (Instant::now(), outcome));
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.cache_size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puzzle(words: [&str; 3]) -> Puzzle {
        Puzzle::from_words(words).unwrap()
    }

    #[test]
    fn memo_reuses_results_within_a_session() {
        let p = puzzle(["A", "A", "B"]);
        let mut memo = ValidationMemo::new(16);
        memo.begin_session(&p, Operator::Add);
        assert!(memo.check(&[1, 2], || true));
        // a second lookup must not run the validator
        assert!(memo.check(&[1, 2], || panic!("memo miss")));
        assert_eq!(memo.hits(), 1);

        memo.begin_session(&p, Operator::Add);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn memo_is_cleared_for_a_new_session() {
        let mut memo = ValidationMemo::new(16);
        memo.begin_session(&puzzle(["A", "A", "B"]), Operator::Add);
        memo.check(&[1, 2], || true);
        memo.begin_session(&puzzle(["A", "A", "B"]), Operator::Mul);
        assert!(memo.is_empty());
        assert!(!memo.check(&[1, 2], || false));
    }

    #[test]
    fn memo_is_bounded() {
        let mut memo = ValidationMemo::new(4);
        memo.begin_session(&puzzle(["A", "A", "B"]), Operator::Add);
        for d in 0..10 {
            memo.check(&[d, 9 - d], || false);
        }
        assert_eq!(memo.len(), 4);
    }

    #[test]
    fn disabled_memo_always_validates() {
        let mut memo = ValidationMemo::new(0);
        memo.begin_session(&puzzle(["A", "A", "B"]), Operator::Add);
        assert!(memo.check(&[1, 2], || true));
        assert!(!memo.check(&[1, 2], || false));
        assert!(memo.is_empty());
    }

    #[test]
    fn packing_keeps_order() {
        assert_ne!(pack(&[1, 2]), pack(&[2, 1]));
        assert_eq!(pack(&[9, 3]), 0x93);
    }

    #[test]
    fn solution_cache_round_trip_and_expiry() {
        let p = puzzle(["A", "A", "B"]);
        let outcome = Outcome::Exhausted { candidates: 90 };

        let mut cache = SolutionCache::new(8, Duration::from_secs(60));
        assert_eq!(cache.get(&p, Operator::Add), None);
        cache.insert(&p, Operator::Add, outcome.clone());
        assert_eq!(cache.get(&p, Operator::Add), Some(outcome.clone()));
        assert_eq!(cache.get(&p, Operator::Sub), None);

        let mut expired = SolutionCache::new(8, Duration::ZERO);
        expired.insert(&p, Operator::Add, outcome);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(expired.get(&p, Operator::Add), None);
        assert!(expired.is_empty());
    }
}
