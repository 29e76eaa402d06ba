use std::fmt;

use itertools::Itertools;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A letter→digit table, kept in letter-set order.
///
/// The letter set never exceeds ten entries, so a small vector of pairs is
/// all the structure this needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Assignment {
    pairs: Vec<(char, u8)>,
}

impl Assignment {
    /// Zips `letters` positionally with a candidate digit tuple.
    pub fn from_digits(letters: &[char], digits: &[u8]) -> Self {
        Assignment {
            pairs: letters.iter().copied().zip(digits.iter().copied()).collect(),
        }
    }

    pub fn get(&self, letter: char) -> Option<u8> {
        self.pairs
            .iter()
            .find_map(|&(l, d)| (l == letter).then_some(d))
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True when no two letters share a digit and no letter appears twice.
    pub fn is_injective(&self) -> bool {
        self.pairs.iter().map(|&(l, _)| l).all_unique()
            && self.pairs.iter().map(|&(_, d)| d).all_unique()
    }
}

impl FromIterator<(char, u8)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (char, u8)>>(iter: I) -> Self {
        Assignment {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = self.iter().map(|(l, d)| format!("{l}={d}")).join(" ");
        f.write_str(&shown)
    }
}

/// Serializes as `{"S": "9", "E": "5", ...}`: digits are one-character strings.
impl Serialize for Assignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pairs.len()))?;
        for (letter, digit) in self.iter() {
            map.serialize_entry(&letter.to_string(), &digit.to_string())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_letter() {
        let assignment = Assignment::from_digits(&['A', 'B', 'C'], &[4, 0, 7]);
        assert_eq!(assignment.get('B'), Some(0));
        assert_eq!(assignment.get('Z'), None);
        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.to_string(), "A=4 B=0 C=7");
    }

    #[test]
    fn injectivity() {
        let ok: Assignment = [('A', 1), ('B', 2)].into_iter().collect();
        let shared_digit: Assignment = [('A', 1), ('B', 1)].into_iter().collect();
        let repeated_letter: Assignment = [('A', 1), ('A', 2)].into_iter().collect();
        assert!(ok.is_injective());
        assert!(!shared_digit.is_injective());
        assert!(!repeated_letter.is_injective());
    }

    #[test]
    fn serializes_digits_as_strings_in_letter_order() {
        let assignment = Assignment::from_digits(&['S', 'E'], &[9, 5]);
        let json = serde_json::to_string(&assignment).unwrap();
        assert_eq!(json, r#"{"S":"9","E":"5"}"#);
    }
}
