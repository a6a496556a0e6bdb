use crate::entity::profile;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use quizdesk_core::domain::{Role, UserId};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub academic_id: Option<String>,
}

/// Profiles mirror identities issued by the authentication provider, so the id is supplied.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub academic_id: Option<String>,
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, new_profile: NewProfile) -> Result<ProfileRecord>;
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<ProfileRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmProfileRepository {
    db: DatabaseConnection,
}

impl SeaOrmProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_role(code: i16) -> Result<Role> {
        match code {
            0 => Ok(Role::Student),
            1 => Ok(Role::Doctor),
            _ => Err(anyhow!("invalid profile.role code from database: {code}")),
        }
    }

    fn map_role_code(role: Role) -> i16 {
        match role {
            Role::Student => 0,
            Role::Doctor => 1,
        }
    }

    fn map_model(model: profile::Model) -> Result<ProfileRecord> {
        let id = UserId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid profile.id '{}' from database: {e}", model.id))?;

        Ok(ProfileRecord {
            id,
            full_name: model.full_name,
            avatar_url: model.avatar_url,
            role: Self::map_role(model.role)?,
            academic_id: model.academic_id,
        })
    }
}

#[async_trait]
impl ProfileRepository for SeaOrmProfileRepository {
    async fn create(&self, new_profile: NewProfile) -> Result<ProfileRecord> {
        let active_model = profile::ActiveModel {
            id: Set(new_profile.id.to_string()),
            full_name: Set(new_profile.full_name),
            avatar_url: Set(new_profile.avatar_url),
            role: Set(Self::map_role_code(new_profile.role)),
            academic_id: Set(new_profile.academic_id),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        let model = active_model.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<ProfileRecord>> {
        let model = profile::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }
}
