//! Shared application state handed to every handler as `Arc<AppState>`.

use std::sync::Arc;

use anyhow::Result;
use quizdesk_core::domain::{Role, UserId};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::{DevIdentity, DevRole};
use crate::repository::{
    NewProfile, ProfileRepository, QuizRepository, SeaOrmProfileRepository,
    SeaOrmQuizRepository, SeaOrmSubmissionRepository, SubmissionRepository,
};
use crate::service::{GradingDesk, Overview, QuizAccess, Submissions};
use crate::storage::ImageStore;

pub struct AppState {
    pub profiles: Arc<dyn ProfileRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub quiz_access: QuizAccess,
    pub submissions: Submissions,
    pub overview: Overview,
    pub grading: GradingDesk,
    /// Fixed caller identity for local development. Replaces header-based identity when set.
    pub dev_identity: Option<DevIdentity>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        images: Arc<dyn ImageStore>,
        dev_identity: Option<DevIdentity>,
    ) -> Self {
        Self::from_parts(
            Arc::new(SeaOrmProfileRepository::new(db.clone())),
            Arc::new(SeaOrmQuizRepository::new(db.clone())),
            Arc::new(SeaOrmSubmissionRepository::new(db)),
            images,
            dev_identity,
        )
    }

    pub fn from_parts(
        profiles: Arc<dyn ProfileRepository>,
        quizzes: Arc<dyn QuizRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        images: Arc<dyn ImageStore>,
        dev_identity: Option<DevIdentity>,
    ) -> Self {
        Self {
            profiles,
            quiz_access: QuizAccess::new(quizzes.clone()),
            submissions: Submissions::new(quizzes.clone(), submissions.clone(), images),
            overview: Overview::new(quizzes.clone(), submissions.clone()),
            grading: GradingDesk::new(quizzes.clone(), submissions),
            quizzes,
            dev_identity,
        }
    }

    /// Makes sure the configured development identity has a profile row to hang quizzes and
    /// submissions on.
    pub async fn ensure_dev_profile(&self) -> Result<()> {
        let Some(identity) = &self.dev_identity else {
            return Ok(());
        };

        let user_id = UserId::from_uuid(identity.user_id);
        if self.profiles.find_by_id(user_id).await?.is_some() {
            return Ok(());
        }

        let role = dev_role(identity.role);
        self.profiles
            .create(NewProfile {
                id: user_id,
                full_name: identity.full_name.clone(),
                avatar_url: None,
                role,
                academic_id: None,
            })
            .await?;
        info!(user_id = %user_id, role = %role, "development profile created");
        Ok(())
    }
}

pub(crate) fn dev_role(role: DevRole) -> Role {
    match role {
        DevRole::Student => Role::Student,
        DevRole::Doctor => Role::Doctor,
    }
}
