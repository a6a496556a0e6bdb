//! Answer-sheet upload and the instructor's view of what was handed in.

use std::sync::Arc;

use chrono::Utc;
use quizdesk_core::domain::{QuizId, UserId};
use tracing::{info, warn};

use super::ServiceError;
use crate::repository::{
    CreateSubmissionError, NewSubmission, QuizRecord, QuizRepository, SubmissionRecord,
    SubmissionRepository,
};
use crate::storage::ImageStore;

/// A photographed answer sheet as received from the client.
#[derive(Debug, Clone)]
pub struct AnswerSheetUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AnswerSheetUpload {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.bytes.is_empty() {
            return Err(ServiceError::Validation("answer sheet image is empty".to_string()));
        }
        match self.content_type.as_deref() {
            Some(content_type) if content_type.starts_with("image/") => Ok(()),
            Some(content_type) => Err(ServiceError::Validation(format!(
                "answer sheet must be an image, got {content_type}"
            ))),
            None => Err(ServiceError::Validation(
                "answer sheet content type is missing".to_string(),
            )),
        }
    }

    /// Extension taken from the file name, falling back to the image subtype.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
        let from_type = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.strip_prefix("image/"))
            .map(|subtype| subtype.split(['+', ';']).next().unwrap_or(subtype))
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name
            .or(from_type)
            .unwrap_or("img")
            .to_ascii_lowercase()
    }
}

/// Storage key for a sheet: `{quiz}/{student}/{millis}.{ext}`.
fn answer_sheet_key(quiz_id: QuizId, student_id: UserId, millis: i64, ext: &str) -> String {
    format!("{quiz_id}/{student_id}/{millis}.{ext}")
}

#[derive(Clone)]
pub struct Submissions {
    quizzes: Arc<dyn QuizRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    images: Arc<dyn ImageStore>,
}

impl Submissions {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            quizzes,
            submissions,
            images,
        }
    }

    /// Stores the image, then records a pending submission pointing at it.
    ///
    /// A student gets one submission per quiz. When the record cannot be written the stored
    /// image is removed again.
    pub async fn submit(
        &self,
        quiz_id: QuizId,
        student_id: UserId,
        upload: AnswerSheetUpload,
    ) -> Result<SubmissionRecord, ServiceError> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or(ServiceError::NotFound("quiz"))?;
        upload.validate()?;

        if self
            .submissions
            .find_by_quiz_and_student(quiz_id, student_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::AlreadySubmitted);
        }

        let key = answer_sheet_key(
            quiz_id,
            student_id,
            Utc::now().timestamp_millis(),
            &upload.extension(),
        );
        let image_url = self.images.store_image(&key, upload.bytes).await?;

        let created = self
            .submissions
            .create(NewSubmission {
                quiz_id,
                student_id,
                image_url: image_url.clone(),
            })
            .await;

        match created {
            Ok(submission) => {
                info!(
                    submission_id = %submission.id,
                    quiz_id = %quiz_id,
                    student_id = %student_id,
                    "answer sheet submitted"
                );
                Ok(submission)
            }
            Err(err) => {
                if let Err(cleanup) = self.images.remove_image(&image_url).await {
                    warn!(
                        url = %image_url,
                        error = %cleanup,
                        "failed to remove orphaned answer sheet"
                    );
                }
                match err {
                    CreateSubmissionError::AlreadySubmitted { .. } => {
                        Err(ServiceError::AlreadySubmitted)
                    }
                    CreateSubmissionError::Other(err) => Err(err.into()),
                }
            }
        }
    }

    /// Loads a quiz and checks that `instructor_id` created it.
    pub async fn owned_quiz(
        &self,
        quiz_id: QuizId,
        instructor_id: UserId,
    ) -> Result<QuizRecord, ServiceError> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or(ServiceError::NotFound("quiz"))?;
        if quiz.instructor_id != instructor_id {
            return Err(ServiceError::Forbidden("only the quiz owner can view its submissions"));
        }
        Ok(quiz)
    }

    pub async fn list_for_quiz(
        &self,
        quiz_id: QuizId,
        instructor_id: UserId,
    ) -> Result<Vec<SubmissionRecord>, ServiceError> {
        self.owned_quiz(quiz_id, instructor_id).await?;
        Ok(self.submissions.list_by_quiz(quiz_id).await?)
    }
}
