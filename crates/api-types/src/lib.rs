//! Shared request/response types used by API-facing crates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub academic_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub duration_mins: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: String,
    pub title: String,
    pub code: String,
    pub instructor_id: String,
    pub start_time: Option<NaiveDateTime>,
    pub duration_mins: Option<u32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCodeRequest {
    pub code: String,
}

/// Where a student goes after entering a valid code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemCodeResponse {
    pub quiz_id: String,
    pub title: String,
    pub submission_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub image_url: String,
    pub status: String,
    pub grade: Option<u8>,
    pub feedback: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorQuizSummary {
    pub quiz: QuizResponse,
    pub total_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentQuizSummary {
    pub quiz: QuizResponse,
    pub submission: Option<SubmissionResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingItemResponse {
    pub submission_id: String,
    pub student_id: String,
    pub image_url: String,
    pub status: String,
    pub grade: Option<u8>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingViewResponse {
    pub quiz_id: String,
    pub items: Vec<GradingItemResponse>,
    pub current_index: Option<usize>,
    pub draft_grade: String,
    pub draft_feedback: String,
}

/// Grade as sent by a client: a JSON number or the text typed into the grade field.
///
/// Nothing is validated here; [`GradeInput::into_draft`] yields the raw text that the grading
/// session validates on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeInput {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl GradeInput {
    #[must_use]
    pub fn into_draft(self) -> String {
        match self {
            GradeInput::Integer(value) => value.to_string(),
            // Debug keeps the fraction, so 7.0 stays "7.0" and is rejected as non-integer.
            GradeInput::Decimal(value) => format!("{value:?}"),
            GradeInput::Text(text) => text,
        }
    }
}

impl Default for GradeInput {
    fn default() -> Self {
        GradeInput::Text(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeDraftRequest {
    #[serde(default)]
    pub grade: GradeInput,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGradeResponse {
    pub saved_index: usize,
    pub advanced: bool,
    pub view: GradingViewResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSubmission {
    pub submission: SubmissionResponse,
    pub quiz_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDashboard {
    pub total: usize,
    pub pending: usize,
    pub graded: usize,
    pub average_grade: f64,
    pub recent: Vec<RecentSubmission>,
    pub upcoming_quiz: Option<QuizResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusQuiz {
    pub quiz: QuizResponse,
    pub pending_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDashboard {
    pub total_quizzes: usize,
    pub total_submissions: usize,
    pub pending: usize,
    pub graded: usize,
    pub recent_quizzes: Vec<QuizResponse>,
    pub focus_quiz: Option<FocusQuiz>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Student(StudentDashboard),
    Doctor(DoctorDashboard),
}
