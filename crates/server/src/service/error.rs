use quizdesk_core::domain::{
    CodeGenerationError, DomainError, GradingError, PersistenceError, QuizCode,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not find an unused quiz code after {attempts} attempts, please try again")]
    GenerationExhausted { attempts: u32 },
    #[error("quiz code {0} was taken by another quiz at the same time, please try again")]
    RaceCollision(QuizCode),
    #[error("invalid quiz code")]
    InvalidCode,
    #[error(transparent)]
    InvalidGrade(DomainError),
    #[error("{0}")]
    Validation(String),
    #[error("you have already submitted an answer sheet for this quiz")]
    AlreadySubmitted,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("authentication required")]
    Unauthenticated,
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Persistence(format!("{err:#}"))
    }
}

impl From<PersistenceError> for ServiceError {
    fn from(err: PersistenceError) -> Self {
        ServiceError::Persistence(err.0)
    }
}

impl From<CodeGenerationError> for ServiceError {
    fn from(err: CodeGenerationError) -> Self {
        match err {
            CodeGenerationError::Exhausted { attempts } => {
                ServiceError::GenerationExhausted { attempts }
            }
            CodeGenerationError::Persistence(err) => err.into(),
        }
    }
}

impl From<GradingError> for ServiceError {
    fn from(err: GradingError) -> Self {
        match err {
            GradingError::InvalidGrade(err) => ServiceError::InvalidGrade(err),
            GradingError::Persistence(err) => err.into(),
            other @ (GradingError::NoCurrentSubmission | GradingError::IndexOutOfRange { .. }) => {
                ServiceError::Validation(other.to_string())
            }
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidGrade(_) => ServiceError::InvalidGrade(err),
            DomainError::EmptyQuizCode => ServiceError::InvalidCode,
            other => ServiceError::Validation(other.to_string()),
        }
    }
}
