use crate::entity::quiz;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use quizdesk_core::domain::{QuizCode, QuizDuration, QuizId, QuizTitle, UserId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::str::FromStr;

use super::is_unique_violation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecord {
    pub id: QuizId,
    pub title: String,
    pub code: QuizCode,
    pub instructor_id: UserId,
    pub start_time: Option<NaiveDateTime>,
    pub duration: Option<QuizDuration>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: QuizTitle,
    pub instructor_id: UserId,
    pub start_time: Option<NaiveDateTime>,
    pub duration: Option<QuizDuration>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateQuizError {
    #[error("quiz code {0} is already taken")]
    DuplicateCode(QuizCode),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(
        &self,
        new_quiz: NewQuiz,
        code: QuizCode,
    ) -> Result<QuizRecord, CreateQuizError>;
    async fn exists_by_code(&self, code: &QuizCode) -> Result<bool>;
    async fn find_by_code(&self, code: &QuizCode) -> Result<Option<QuizRecord>>;
    async fn find_by_id(&self, quiz_id: QuizId) -> Result<Option<QuizRecord>>;
    /// Newest first.
    async fn list_by_instructor(&self, instructor_id: UserId) -> Result<Vec<QuizRecord>>;
    /// Latest start time first; unscheduled quizzes last.
    async fn list_all(&self) -> Result<Vec<QuizRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmQuizRepository {
    db: DatabaseConnection,
}

impl SeaOrmQuizRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: quiz::Model) -> Result<QuizRecord> {
        let id = QuizId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid quiz.id '{}' from database: {e}", model.id))?;
        let instructor_id = UserId::from_str(&model.instructor_id).map_err(|e| {
            anyhow!(
                "invalid quiz.instructor_id '{}' from database: {e}",
                model.instructor_id
            )
        })?;
        let code = QuizCode::normalize(&model.code)
            .map_err(|e| anyhow!("invalid quiz.code '{}' from database: {e}", model.code))?;
        let duration = model
            .duration_mins
            .map(|mins| QuizDuration::from_minutes(i64::from(mins)))
            .transpose()
            .map_err(|e| anyhow!("invalid quiz.duration_mins from database: {e}"))?;

        Ok(QuizRecord {
            id,
            title: model.title,
            code,
            instructor_id,
            start_time: model.start_time,
            duration,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl QuizRepository for SeaOrmQuizRepository {
    async fn create(
        &self,
        new_quiz: NewQuiz,
        code: QuizCode,
    ) -> Result<QuizRecord, CreateQuizError> {
        let id = QuizId::new();
        let duration_mins = new_quiz
            .duration
            .map(|d| i32::try_from(d.minutes()))
            .transpose()
            .map_err(|e| anyhow!("quiz duration does not fit the database column: {e}"))?;

        let active_model = quiz::ActiveModel {
            id: Set(id.to_string()),
            title: Set(new_quiz.title.into_inner()),
            code: Set(code.as_str().to_string()),
            instructor_id: Set(new_quiz.instructor_id.to_string()),
            start_time: Set(new_quiz.start_time),
            duration_mins: Set(duration_mins),
            created_at: Set(chrono::Utc::now().naive_utc()),
        };

        let model = match active_model.insert(&self.db).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                return Err(CreateQuizError::DuplicateCode(code));
            }
            Err(err) => return Err(anyhow::Error::from(err).into()),
        };

        Ok(Self::map_model(model)?)
    }

    async fn exists_by_code(&self, code: &QuizCode) -> Result<bool> {
        let count = quiz::Entity::find()
            .filter(quiz::Column::Code.eq(code.as_str()))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_code(&self, code: &QuizCode) -> Result<Option<QuizRecord>> {
        let model = quiz::Entity::find()
            .filter(quiz::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_by_id(&self, quiz_id: QuizId) -> Result<Option<QuizRecord>> {
        let model = quiz::Entity::find_by_id(quiz_id.to_string())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list_by_instructor(&self, instructor_id: UserId) -> Result<Vec<QuizRecord>> {
        let models = quiz::Entity::find()
            .filter(quiz::Column::InstructorId.eq(instructor_id.to_string()))
            .order_by_desc(quiz::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_all(&self) -> Result<Vec<QuizRecord>> {
        let models = quiz::Entity::find()
            .order_by_desc(quiz::Column::StartTime)
            .order_by_desc(quiz::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut records = models
            .into_iter()
            .map(Self::map_model)
            .collect::<Result<Vec<_>>>()?;
        // NULL ordering differs between backends.
        records.sort_by_key(|quiz| quiz.start_time.is_none());
        Ok(records)
    }
}
