use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quizdesk_api_types::ErrorResponse;
use tracing::error;

use crate::service::ServiceError;

/// Handler error. Renders a [`ServiceError`] as a status code plus [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            ServiceError::GenerationExhausted { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_EXHAUSTED")
            }
            ServiceError::RaceCollision(_) => (StatusCode::CONFLICT, "RACE_COLLISION"),
            ServiceError::InvalidCode => (StatusCode::NOT_FOUND, "INVALID_CODE"),
            ServiceError::InvalidGrade(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_GRADE"),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ServiceError::AlreadySubmitted => (StatusCode::CONFLICT, "ALREADY_SUBMITTED"),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ServiceError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ServiceError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(err.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError(ServiceError::Validation(format!(
            "invalid multipart body: {}",
            err.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self.0 {
            ServiceError::Persistence(detail) => {
                error!(detail = %detail, "request failed on persistence");
                "internal storage failure".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
