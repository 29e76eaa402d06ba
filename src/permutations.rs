//! Candidate generation: ordered selections of distinct decimal digits.
//!
//! [`DigitPermutations`] enumerates in lexicographic order: the first
//! position takes 0 before 1 before 2, and so on down the tuple. The search
//! reports the first valid candidate, so this order decides which solution
//! is returned when a puzzle has several.

use itertools::Itertools;

/// One digit per letter, ordered like the puzzle's letter set.
pub type Digits = Vec<u8>;

/// Number of decimal digits available.
pub const DIGITS: u8 = 10;

/// `n! / (n - k)!`, the count of ordered `k`-selections from `n` items.
pub fn falling_factorial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    (n - k + 1..=n).product()
}

/// A deterministic, finite stream of candidate digit tuples.
///
/// Each call yields a fresh stream that is exhausted once. Implementations
/// must never repeat a digit within a tuple.
pub trait CandidateSource: Sync {
    /// Every tuple of `len` distinct digits.
    fn candidates(&self, len: usize) -> Box<dyn Iterator<Item = Digits> + '_>;

    /// The tuples of [`CandidateSource::candidates`] that start with `first`,
    /// in the same relative order.
    fn branch(&self, len: usize, first: u8) -> Box<dyn Iterator<Item = Digits> + '_> {
        Box::new(
            self.candidates(len)
                .filter(move |digits| digits.first() == Some(&first)),
        )
    }
}

/// Lexicographic permutations of `0..=9`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitPermutations;

impl CandidateSource for DigitPermutations {
    fn candidates(&self, len: usize) -> Box<dyn Iterator<Item = Digits> + '_> {
        Box::new((0..DIGITS).permutations(len))
    }

    fn branch(&self, len: usize, first: u8) -> Box<dyn Iterator<Item = Digits> + '_> {
        if len == 0 || first >= DIGITS {
            return Box::new(std::iter::empty());
        }
        Box::new(
            (0..DIGITS)
                .filter(move |&d| d != first)
                .permutations(len - 1)
                .map(move |mut rest| {
                    rest.insert(0, first);
                    rest
                }),
        )
    }
}
