//! HTTP routes.

pub mod auth;
pub mod dashboard;
pub mod dto;
pub mod error;
pub mod grading;
pub mod profile;
pub mod quizzes;
pub mod state;
pub mod submissions;

use std::path::Path;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};

pub use auth::{CurrentUser, USER_ID_HEADER};
pub use dashboard::create_dashboard_router;
pub use error::ApiError;
pub use grading::create_grading_router;
pub use profile::create_profile_router;
pub use quizzes::create_quiz_router;
pub use state::AppState;
pub use submissions::create_submission_router;

/// Assembles the full application router. Stored answer sheets under `upload_dir` are served
/// at `uploads_route`, which must match the path of the image store's public base URL.
pub fn create_router(
    state: Arc<AppState>,
    upload_dir: &Path,
    uploads_route: &str,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .merge(create_profile_router())
        .merge(create_quiz_router())
        .merge(create_submission_router())
        .merge(create_grading_router())
        .merge(create_dashboard_router())
        .nest_service(uploads_route, ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
