use crate::entity::submission;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use quizdesk_core::domain::{Grade, GradeUpdate, QuizId, SubmissionId, SubmissionStatus, UserId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::str::FromStr;

use super::is_unique_violation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub quiz_id: QuizId,
    pub student_id: UserId,
    pub image_url: String,
    pub status: SubmissionStatus,
    pub grade: Option<Grade>,
    pub feedback: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub quiz_id: QuizId,
    pub student_id: UserId,
    pub image_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateSubmissionError {
    #[error("student {student_id} already submitted quiz {quiz_id}")]
    AlreadySubmitted { quiz_id: QuizId, student_id: UserId },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(
        &self,
        new_submission: NewSubmission,
    ) -> Result<SubmissionRecord, CreateSubmissionError>;
    async fn find_by_quiz_and_student(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<SubmissionRecord>>;
    /// Newest first.
    async fn list_by_quiz(&self, quiz_id: QuizId) -> Result<Vec<SubmissionRecord>>;
    /// Newest first.
    async fn list_by_student(&self, student_id: UserId) -> Result<Vec<SubmissionRecord>>;
    async fn list_by_quizzes(&self, quiz_ids: &[QuizId]) -> Result<Vec<SubmissionRecord>>;
    async fn update_grade(
        &self,
        submission_id: SubmissionId,
        update: &GradeUpdate,
    ) -> Result<Option<SubmissionRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmSubmissionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubmissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_status(code: i16) -> Result<SubmissionStatus> {
        match code {
            0 => Ok(SubmissionStatus::Pending),
            1 => Ok(SubmissionStatus::Graded),
            _ => Err(anyhow!("invalid submission.status code from database: {code}")),
        }
    }

    fn map_status_code(status: SubmissionStatus) -> i16 {
        match status {
            SubmissionStatus::Pending => 0,
            SubmissionStatus::Graded => 1,
        }
    }

    fn map_model(model: submission::Model) -> Result<SubmissionRecord> {
        let id = SubmissionId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid submission.id '{}' from database: {e}", model.id))?;
        let quiz_id = QuizId::from_str(&model.quiz_id).map_err(|e| {
            anyhow!(
                "invalid submission.quiz_id '{}' from database: {e}",
                model.quiz_id
            )
        })?;
        let student_id = UserId::from_str(&model.student_id).map_err(|e| {
            anyhow!(
                "invalid submission.student_id '{}' from database: {e}",
                model.student_id
            )
        })?;
        let grade = model
            .grade
            .map(Grade::try_from)
            .transpose()
            .map_err(|e| anyhow!("invalid submission.grade from database: {e}"))?;

        Ok(SubmissionRecord {
            id,
            quiz_id,
            student_id,
            image_url: model.image_url,
            status: Self::map_status(model.status)?,
            grade,
            feedback: model.feedback,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl SubmissionRepository for SeaOrmSubmissionRepository {
    async fn create(
        &self,
        new_submission: NewSubmission,
    ) -> Result<SubmissionRecord, CreateSubmissionError> {
        let id = SubmissionId::new();
        let now = chrono::Utc::now().naive_utc();

        let active_model = submission::ActiveModel {
            id: Set(id.to_string()),
            quiz_id: Set(new_submission.quiz_id.to_string()),
            student_id: Set(new_submission.student_id.to_string()),
            image_url: Set(new_submission.image_url),
            status: Set(Self::map_status_code(SubmissionStatus::Pending)),
            grade: Set(None),
            feedback: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = match active_model.insert(&self.db).await {
            Ok(model) => model,
            Err(err) if is_unique_violation(&err) => {
                return Err(CreateSubmissionError::AlreadySubmitted {
                    quiz_id: new_submission.quiz_id,
                    student_id: new_submission.student_id,
                });
            }
            Err(err) => return Err(anyhow::Error::from(err).into()),
        };

        Ok(Self::map_model(model)?)
    }

    async fn find_by_quiz_and_student(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
    ) -> Result<Option<SubmissionRecord>> {
        let model = submission::Entity::find()
            .filter(submission::Column::QuizId.eq(quiz_id.to_string()))
            .filter(submission::Column::StudentId.eq(student_id.to_string()))
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list_by_quiz(&self, quiz_id: QuizId) -> Result<Vec<SubmissionRecord>> {
        let models = submission::Entity::find()
            .filter(submission::Column::QuizId.eq(quiz_id.to_string()))
            .order_by_desc(submission::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_student(&self, student_id: UserId) -> Result<Vec<SubmissionRecord>> {
        let models = submission::Entity::find()
            .filter(submission::Column::StudentId.eq(student_id.to_string()))
            .order_by_desc(submission::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_quizzes(&self, quiz_ids: &[QuizId]) -> Result<Vec<SubmissionRecord>> {
        if quiz_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = submission::Entity::find()
            .filter(submission::Column::QuizId.is_in(quiz_ids.iter().map(ToString::to_string)))
            .order_by_desc(submission::Column::CreatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn update_grade(
        &self,
        submission_id: SubmissionId,
        update: &GradeUpdate,
    ) -> Result<Option<SubmissionRecord>> {
        let Some(model) = submission::Entity::find_by_id(submission_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active_model: submission::ActiveModel = model.into();
        active_model.status = Set(Self::map_status_code(update.status));
        active_model.grade = Set(Some(i16::from(update.grade)));
        active_model.feedback = Set(update.feedback.clone());
        active_model.updated_at = Set(chrono::Utc::now().naive_utc());

        let updated = active_model.update(&self.db).await?;
        Self::map_model(updated).map(Some)
    }
}
