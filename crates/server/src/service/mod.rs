//! Application services sitting between the HTTP handlers and the repositories.

mod error;
mod grading_desk;
mod overview;
mod quiz_access;
mod submissions;

pub use error::ServiceError;
pub use grading_desk::{GradingDesk, RepositoryGradeRecorder};
pub use overview::{
    DoctorOverview, InstructorQuiz, Overview, StudentOverview, StudentQuiz, average_grade,
    focus_quiz, upcoming_quiz,
};
pub use quiz_access::{QuizAccess, RACE_RETRIES, RepositoryCodeOracle};
pub use submissions::{AnswerSheetUpload, Submissions};
