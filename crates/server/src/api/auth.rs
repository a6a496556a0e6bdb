//! Caller identity.
//!
//! Authentication itself happens upstream. The gateway forwards the authenticated user id in
//! the `x-user-id` header; a configured development identity takes precedence over it.

use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use quizdesk_core::domain::{Role, UserId};
use tracing::debug;

use super::error::ApiError;
use super::state::{AppState, dev_role};
use crate::repository::ProfileRecord;
use crate::service::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";

pub struct CurrentUser(pub ProfileRecord);

impl Deref for CurrentUser {
    type Target = ProfileRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl CurrentUser {
    pub fn require_role(&self, role: Role, message: &'static str) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(message).into())
        }
    }

    pub fn require_doctor(&self) -> Result<(), ApiError> {
        self.require_role(Role::Doctor, "this action is reserved for doctors")
    }

    pub fn require_student(&self) -> Result<(), ApiError> {
        self.require_role(Role::Student, "this action is reserved for students")
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = &state.dev_identity {
            let user_id = UserId::from_uuid(identity.user_id);
            // The stored profile wins so edits to it show up; the configured role always applies.
            let profile = match state.profiles.find_by_id(user_id).await? {
                Some(mut profile) => {
                    profile.role = dev_role(identity.role);
                    profile
                }
                None => ProfileRecord {
                    id: user_id,
                    full_name: identity.full_name.clone(),
                    avatar_url: None,
                    role: dev_role(identity.role),
                    academic_id: None,
                },
            };
            return Ok(Self(profile));
        }

        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| UserId::from_str(value.trim()).ok())
            .ok_or(ServiceError::Unauthenticated)?;

        let profile = state.profiles.find_by_id(user_id).await?.ok_or_else(|| {
            debug!(user_id = %user_id, "request for unknown profile");
            ServiceError::Unauthenticated
        })?;

        Ok(Self(profile))
    }
}
