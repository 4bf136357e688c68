use crate::CodeError;
use std::fmt;
use std::str::FromStr;

/// Term number within an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Term {
    First,
    Second,
    /// The summer term
    Summer,
}

impl Term {
    /// Returns the portal's numbering of this term (1, 2 or 3)
    pub fn number(&self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Summer => 3,
        }
    }
}

impl TryFrom<i64> for Term {
    type Error = CodeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Summer),
            other => Err(CodeError::InvalidTerm(other)),
        }
    }
}

impl FromStr for Term {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| CodeError::InvalidNumber(s.to_string()))?;
        Self::try_from(value)
    }
}

/// The portal's internal identifier for one academic term
///
/// Always rendered with at least three characters, left-padded with zeros.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermCode(String);

impl TermCode {
    /// Computes the term code for an academic year and term
    ///
    /// `year` is the last two digits of the year the academic year starts in
    /// (e.g. `25` for 2025-2026). The year is not range checked: years the
    /// portal does not know about simply produce a code with no results.
    ///
    /// # Examples
    ///
    /// ```
    /// use dkmh_harvest::codes::{Term, TermCode};
    ///
    /// assert_eq!(TermCode::compute(25, Term::First).as_str(), "044");
    /// assert_eq!(TermCode::compute(25, Term::Summer).as_str(), "046");
    /// ```
    pub fn compute(year: i32, term: Term) -> Self {
        let code = 3 * i64::from(year) + term.number() - 32;
        Self(format!("{:0>3}", code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TermCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
