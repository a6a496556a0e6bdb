use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Mark awarded to a submission, an integer in `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grade(u8);

impl Grade {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| DomainError::InvalidGrade(value.to_string()))
    }

    /// Parses grader input. Only a plain decimal integer is accepted.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| DomainError::InvalidGrade(trimmed.to_string()))?;

        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Grade {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<i16> for Grade {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Grade> for i16 {
    fn from(value: Grade) -> Self {
        i16::from(value.0)
    }
}
