mod code_generator;
mod error;
mod grade;
mod grading;
mod ids;
mod quiz;
mod quiz_code;
mod role;
mod submission_status;

pub use code_generator::{
    CodeGenerationError, CodeGenerator, CodeOracle, CodeSource, MAX_GENERATION_ATTEMPTS,
    RandomCodeSource,
};
pub use error::{DomainError, PersistenceError};
pub use grade::Grade;
pub use grading::{
    GradeDraft, GradeRecorder, GradeUpdate, GradingError, GradingItem, GradingSession,
    SaveOutcome,
};
pub use ids::{QuizId, SubmissionId, UserId};
pub use quiz::{QuizDuration, QuizTitle};
pub use quiz_code::{CODE_ALPHABET, QuizCode};
pub use role::Role;
pub use submission_status::SubmissionStatus;
