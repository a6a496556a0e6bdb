mod profile_repository;
mod quiz_repository;
mod submission_repository;

pub use profile_repository::{NewProfile, ProfileRecord, ProfileRepository, SeaOrmProfileRepository};
pub use quiz_repository::{
    CreateQuizError, NewQuiz, QuizRecord, QuizRepository, SeaOrmQuizRepository,
};
pub use submission_repository::{
    CreateSubmissionError, NewSubmission, SeaOrmSubmissionRepository, SubmissionRecord,
    SubmissionRepository,
};

use sea_orm::{DbErr, SqlErr};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
