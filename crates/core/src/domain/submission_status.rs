use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// A submission starts `Pending` and moves to `Graded` once, when a grade is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Graded,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Graded => "graded",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "graded" => Ok(SubmissionStatus::Graded),
            other => Err(DomainError::UnknownSubmissionStatus(other.to_string())),
        }
    }
}
