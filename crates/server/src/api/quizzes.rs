//! Quiz creation, code redemption and quiz listings.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use quizdesk_api_types::{
    CreateQuizRequest, InstructorQuizSummary, QuizResponse, RedeemCodeRequest,
    RedeemCodeResponse, StudentQuizSummary,
};
use quizdesk_core::domain::{QuizDuration, QuizId, QuizTitle};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::dto::{instructor_quiz_summary, quiz_response, student_quiz_summary};
use super::error::ApiError;
use super::state::AppState;
use crate::repository::NewQuiz;
use crate::service::ServiceError;

pub fn create_quiz_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quizzes", post(create_quiz))
        .route("/api/quizzes/redeem", post(redeem_code))
        .route("/api/quizzes/{quiz_id}", get(get_quiz))
        .route("/api/doctor/quizzes", get(list_doctor_quizzes))
        .route("/api/student/quizzes", get(list_student_quizzes))
}

async fn create_quiz(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    user.require_doctor()?;

    let title = QuizTitle::new(request.title).map_err(ServiceError::from)?;
    let duration = request
        .duration_mins
        .map(QuizDuration::from_minutes)
        .transpose()
        .map_err(ServiceError::from)?;

    let quiz = state
        .quiz_access
        .create_quiz(NewQuiz {
            title,
            instructor_id: user.id,
            start_time: request.start_time,
            duration,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(quiz_response(&quiz))))
}

async fn redeem_code(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(request): Json<RedeemCodeRequest>,
) -> Result<Json<RedeemCodeResponse>, ApiError> {
    user.require_student()?;

    let quiz = state.quiz_access.redeem(&request.code).await?;
    Ok(Json(RedeemCodeResponse {
        quiz_id: quiz.id.to_string(),
        title: quiz.title,
        submission_path: format!("/api/quizzes/{}/submissions", quiz.id),
    }))
}

async fn get_quiz(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = state
        .quizzes
        .find_by_id(QuizId::from_uuid(quiz_id))
        .await?
        .ok_or(ServiceError::NotFound("quiz"))?;

    Ok(Json(quiz_response(&quiz)))
}

async fn list_doctor_quizzes(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<InstructorQuizSummary>>, ApiError> {
    user.require_doctor()?;

    let quizzes = state.overview.instructor_quizzes(user.id).await?;
    Ok(Json(quizzes.iter().map(instructor_quiz_summary).collect()))
}

async fn list_student_quizzes(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<StudentQuizSummary>>, ApiError> {
    user.require_student()?;

    let quizzes = state.overview.student_quizzes(user.id).await?;
    Ok(Json(quizzes.iter().map(student_quiz_summary).collect()))
}
