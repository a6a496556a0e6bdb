//! Answer-sheet uploads.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::post,
};
use quizdesk_api_types::SubmissionResponse;
use quizdesk_core::domain::QuizId;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::dto::submission_response;
use super::error::ApiError;
use super::state::AppState;
use crate::service::{AnswerSheetUpload, ServiceError};

/// Multipart field carrying the answer-sheet image.
pub const IMAGE_FIELD: &str = "image";

pub fn create_submission_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/quizzes/{quiz_id}/submissions",
        post(upload_answer_sheet).get(list_submissions),
    )
}

async fn upload_answer_sheet(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    user.require_student()?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(AnswerSheetUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| {
        ServiceError::Validation(format!("multipart field '{IMAGE_FIELD}' is required"))
    })?;

    let submission = state
        .submissions
        .submit(QuizId::from_uuid(quiz_id), user.id, upload)
        .await?;

    Ok((StatusCode::CREATED, Json(submission_response(&submission))))
}

async fn list_submissions(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    user.require_doctor()?;

    let submissions = state
        .submissions
        .list_for_quiz(QuizId::from_uuid(quiz_id), user.id)
        .await?;
    Ok(Json(submissions.iter().map(submission_response).collect()))
}
