use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid grade: '{0}'. grade must be an integer in [0, 10]")]
    InvalidGrade(String),
    #[error("quiz code must not be empty")]
    EmptyQuizCode,
    #[error("quiz title must not be empty")]
    EmptyQuizTitle,
    #[error("invalid quiz title length: {0}. title must be at most 200 characters")]
    InvalidQuizTitleLength(usize),
    #[error("invalid quiz duration: {0}. duration must be at least 1 minute")]
    InvalidQuizDuration(i64),
    #[error("unknown role: '{0}'")]
    UnknownRole(String),
    #[error("unknown submission status: '{0}'")]
    UnknownSubmissionStatus(String),
}

/// Failure reported by a persistence collaborator behind one of the domain traits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("persistence failure: {0}")]
pub struct PersistenceError(pub String);

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
