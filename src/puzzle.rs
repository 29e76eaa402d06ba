use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::assignment::Assignment;
use crate::errors::SolveError;

/// Rows in every puzzle: two operands and a result.
pub const ROWS: usize = 3;
/// Distinct letters that can receive distinct decimal digits.
pub const MAX_LETTERS: usize = 10;

/// The relation between the two operand rows and the result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_symbol(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Checks `lhs <op> rhs == result`.
    ///
    /// A negative difference or an overflowing sum or product never matches.
    /// Division must be exact, and a zero divisor never matches.
    pub fn holds(self, lhs: u128, rhs: u128, result: u128) -> bool {
        let value = match self {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Sub => lhs.checked_sub(rhs),
            Operator::Mul => lhs.checked_mul(rhs),
            Operator::Div => lhs
                .checked_rem(rhs)
                .filter(|&rem| rem == 0)
                .and_then(|_| lhs.checked_div(rhs)),
        };
        value == Some(result)
    }
}

impl FromStr for Operator {
    type Err = SolveError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Operator::from_symbol(c),
            _ => None,
        }
        .ok_or_else(|| SolveError::UnsupportedOperator { token: token.to_string() })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A three-row cryptarithm grid.
///
/// Rows are kept both as letters and as indices into the letter set, so a
/// candidate digit tuple (ordered like [`Puzzle::letters`]) can be evaluated
/// without any lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Puzzle {
    rows: [Vec<char>; ROWS],
    letters: Vec<char>,
    indices: [Vec<usize>; ROWS],
}

impl Puzzle {
    /// Builds a puzzle from grid cells.
    ///
    /// Cells are trimmed and empty cells skipped. Every other cell must be a
    /// single alphabetic character.
    pub fn new<S: AsRef<str>>(cells: &[Vec<S>]) -> Result<Self, SolveError> {
        if cells.len() != ROWS {
            return Err(SolveError::malformed(format!(
                "expected {ROWS} rows, got {}",
                cells.len()
            )));
        }

        let mut rows: [Vec<char>; ROWS] = Default::default();
        for (row, (slot, cells)) in rows.iter_mut().zip(cells).enumerate() {
            for cell in cells {
                let cell = cell.as_ref().trim();
                let mut chars = cell.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => continue,
                    (Some(c), None) if c.is_alphabetic() => slot.push(c),
                    _ => {
                        return Err(SolveError::malformed(format!(
                            "row {} has invalid cell \"{cell}\"",
                            row + 1
                        )))
                    }
                }
            }
        }
        Self::from_rows(rows)
    }

    /// Builds a puzzle from three words, one letter per cell.
    pub fn from_words(words: [&str; ROWS]) -> Result<Self, SolveError> {
        let cells = words
            .iter()
            .map(|word| word.chars().map(String::from).collect_vec())
            .collect_vec();
        Self::new(&cells)
    }

    fn from_rows(rows: [Vec<char>; ROWS]) -> Result<Self, SolveError> {
        for (i, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(SolveError::malformed(format!("row {} is empty", i + 1)));
            }
        }

        // letter set, in order of first appearance
        let letters = rows.iter().flatten().copied().unique().collect_vec();
        let indices = rows.clone().map(|row| {
            row.iter()
                .map(|c| letters.iter().position(|l| l == c).unwrap_or_default())
                .collect_vec()
        });
        Ok(Puzzle { rows, letters, indices })
    }

    /// Distinct letters, in order of first appearance.
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn rows(&self) -> &[Vec<char>; ROWS] {
        &self.rows
    }

    /// Value of `row` when letter `i` stands for `digits[i]`.
    ///
    /// `None` when `digits` is too short for the letter set or the value
    /// overflows a `u128` (rows longer than 38 letters can).
    pub fn row_value(&self, row: usize, digits: &[u8]) -> Option<u128> {
        self.indices[row].iter().try_fold(0u128, |acc, &i| {
            let digit = u128::from(*digits.get(i)?);
            acc.checked_mul(10)?.checked_add(digit)
        })
    }

    /// Checks the relation for a digit tuple ordered like [`Puzzle::letters`].
    /// A tuple whose rows cannot be evaluated never matches.
    pub fn check(&self, operator: Operator, digits: &[u8]) -> bool {
        match self.row_values(digits) {
            Some([lhs, rhs, result]) => operator.holds(lhs, rhs, result),
            None => false,
        }
    }

    fn row_values(&self, digits: &[u8]) -> Option<[u128; ROWS]> {
        Some([
            self.row_value(0, digits)?,
            self.row_value(1, digits)?,
            self.row_value(2, digits)?,
        ])
    }

    /// Row values under `assignment`, or `None` if it misses a letter or a
    /// row overflows.
    pub fn values(&self, assignment: &Assignment) -> Option<[u128; ROWS]> {
        let digits: Vec<u8> = self
            .letters
            .iter()
            .map(|&c| assignment.get(c))
            .collect::<Option<_>>()?;
        self.row_values(&digits)
    }

    /// Re-evaluates an arbitrary assignment against the relation.
    pub fn holds(&self, operator: Operator, assignment: &Assignment) -> bool {
        assignment.is_injective()
            && self
                .values(assignment)
                .is_some_and(|[lhs, rhs, result]| operator.holds(lhs, rhs, result))
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.rows.iter().map(|row| row.iter().join("")).join(", ");
        write!(f, "[{words}]")
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(Vec<char>),
    Operator(String),
    Equals,
}

/// Parses an equation such as `"SEND + MORE = MONEY"`.
pub fn parse_equation(equation: &str) -> Result<(Puzzle, Operator), SolveError> {
    let mut tokens = vec![];
    let mut buffer = vec![];
    for ch in equation.chars() {
        if ch.is_alphabetic() {
            buffer.push(ch);
            continue;
        }
        if !buffer.is_empty() {
            tokens.push(Token::Word(buffer.split_off(0)));
        }
        if ch.is_whitespace() {
            continue;
        } else if ch == '=' {
            tokens.push(Token::Equals);
        } else if ch.is_numeric() {
            return Err(SolveError::malformed(format!("digit '{ch}' in equation")));
        } else {
            match tokens.last_mut() {
                Some(Token::Operator(op)) => op.push(ch),
                _ => tokens.push(Token::Operator(ch.to_string())),
            }
        }
    }
    if !buffer.is_empty() {
        tokens.push(Token::Word(buffer));
    }

    match tokens.as_mut_slice() {
        [Token::Word(a), Token::Operator(op), Token::Word(b), Token::Equals, Token::Word(c)] => {
            let operator = op.parse()?;
            let rows = [std::mem::take(a), std::mem::take(b), std::mem::take(c)];
            Ok((Puzzle::from_rows(rows)?, operator))
        }
        _ => Err(SolveError::malformed(format!(
            "expected \"WORD <op> WORD = WORD\", got \"{}\"",
            equation.trim()
        ))),
    }
}
