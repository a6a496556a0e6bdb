use std::sync::Arc;

use axum::{Json, Router, routing::get};
use quizdesk_api_types::{HealthCheckResponse, ProfileResponse};

use super::auth::CurrentUser;
use super::dto::profile_response;
use super::state::AppState;

pub fn create_profile_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/me", get(me))
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}

async fn me(user: CurrentUser) -> Json<ProfileResponse> {
    Json(profile_response(&user))
}
