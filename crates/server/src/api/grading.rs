//! Grading sessions: open one, walk through the submissions, save grades.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use quizdesk_api_types::{GradeDraftRequest, GradingViewResponse, SaveGradeResponse};
use quizdesk_core::domain::QuizId;
use uuid::Uuid;

use super::auth::CurrentUser;
use super::dto::grading_view;
use super::error::ApiError;
use super::state::AppState;
use crate::service::ServiceError;

pub fn create_grading_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/grading/{quiz_id}",
            post(open_session).get(view_session).delete(close_session),
        )
        .route("/api/grading/{quiz_id}/next", post(next_submission))
        .route("/api/grading/{quiz_id}/previous", post(previous_submission))
        .route("/api/grading/{quiz_id}/select/{index}", post(select_submission))
        .route("/api/grading/{quiz_id}/draft", put(update_draft))
        .route("/api/grading/{quiz_id}/save", post(save_grade))
}

async fn open_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let session = state.grading.open(user.id, quiz_id).await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

async fn view_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let session = state.grading.view(user.id, quiz_id).await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

async fn next_submission(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let session = state.grading.next(user.id, quiz_id).await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

async fn previous_submission(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let session = state.grading.previous(user.id, quiz_id).await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

async fn select_submission(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path((quiz_id, index)): Path<(Uuid, usize)>,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let session = state.grading.select(user.id, quiz_id, index).await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

async fn update_draft(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<GradingViewResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let (grade, feedback) = parse_draft(&body)?.ok_or_else(|| {
        ServiceError::Validation("grade draft body is required".to_string())
    })?;
    let session = state
        .grading
        .set_draft(user.id, quiz_id, grade, feedback)
        .await?;
    Ok(Json(grading_view(quiz_id, &session)))
}

/// The body is optional: without one the draft already held by the session is saved.
async fn save_grade(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<SaveGradeResponse>, ApiError> {
    user.require_doctor()?;
    let quiz_id = QuizId::from_uuid(quiz_id);

    let draft = parse_draft(&body)?;
    let (outcome, session) = state.grading.save(user.id, quiz_id, draft).await?;
    Ok(Json(SaveGradeResponse {
        saved_index: outcome.saved_index,
        advanced: outcome.advanced,
        view: grading_view(quiz_id, &session),
    }))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(quiz_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    user.require_doctor()?;

    if state.grading.close(user.id, QuizId::from_uuid(quiz_id)) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServiceError::NotFound("grading session").into())
    }
}

/// Reads an optional JSON draft. Malformed bodies become `VALIDATION_FAILED` responses.
fn parse_draft(body: &[u8]) -> Result<Option<(String, String)>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let draft: GradeDraftRequest = serde_json::from_slice(body)
        .map_err(|err| ServiceError::Validation(format!("invalid grade draft body: {err}")))?;
    Ok(Some((draft.grade.into_draft(), draft.feedback)))
}
