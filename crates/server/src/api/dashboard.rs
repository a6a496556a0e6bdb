use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use quizdesk_api_types::DashboardResponse;
use quizdesk_core::domain::Role;

use super::auth::CurrentUser;
use super::dto::{doctor_dashboard, student_dashboard};
use super::error::ApiError;
use super::state::AppState;

pub fn create_dashboard_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// Figures for the caller's home screen; the shape depends on the caller's role.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let response = match user.role {
        Role::Student => {
            let overview = state
                .overview
                .student_dashboard(user.id, Utc::now().naive_utc())
                .await?;
            DashboardResponse::Student(student_dashboard(&overview))
        }
        Role::Doctor => {
            let overview = state.overview.doctor_dashboard(user.id).await?;
            DashboardResponse::Doctor(doctor_dashboard(&overview))
        }
    };

    Ok(Json(response))
}
