//! In-memory grading sessions, one per (instructor, quiz).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use quizdesk_core::domain::{
    GradeRecorder, GradeUpdate, GradingItem, GradingSession, PersistenceError, QuizId,
    SaveOutcome, SubmissionId, UserId,
};
use tokio::sync::Mutex as SessionLock;
use tracing::{debug, info};

use super::ServiceError;
use crate::repository::{QuizRepository, SubmissionRecord, SubmissionRepository};

/// Writes grades straight to the submission table.
pub struct RepositoryGradeRecorder<'a>(pub &'a dyn SubmissionRepository);

#[async_trait]
impl GradeRecorder for RepositoryGradeRecorder<'_> {
    async fn record_grade(
        &self,
        submission_id: SubmissionId,
        update: &GradeUpdate,
    ) -> Result<(), PersistenceError> {
        match self.0.update_grade(submission_id, update).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(PersistenceError::new(format!(
                "submission {submission_id} no longer exists"
            ))),
            Err(err) => Err(PersistenceError::new(format!("{err:#}"))),
        }
    }
}

type SessionKey = (UserId, QuizId);

/// Owns every open grading session. Handlers only ever see snapshots.
pub struct GradingDesk {
    quizzes: Arc<dyn QuizRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    sessions: Mutex<HashMap<SessionKey, Arc<SessionLock<GradingSession>>>>,
}

impl GradingDesk {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            quizzes,
            submissions,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a fresh session over the quiz's submissions, newest first. An existing session
    /// for the same instructor and quiz is replaced.
    pub async fn open(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
    ) -> Result<GradingSession, ServiceError> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or(ServiceError::NotFound("quiz"))?;
        if quiz.instructor_id != instructor_id {
            return Err(ServiceError::Forbidden("only the quiz owner can grade it"));
        }

        let items = self
            .submissions
            .list_by_quiz(quiz_id)
            .await?
            .into_iter()
            .map(grading_item)
            .collect::<Vec<_>>();
        let session = GradingSession::new(items);
        info!(
            quiz_id = %quiz_id,
            instructor_id = %instructor_id,
            submissions = session.len(),
            "grading session opened"
        );

        self.lock_sessions().insert(
            (instructor_id, quiz_id),
            Arc::new(SessionLock::new(session.clone())),
        );
        Ok(session)
    }

    pub async fn view(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
    ) -> Result<GradingSession, ServiceError> {
        let session = self.session(instructor_id, quiz_id)?;
        let guard = session.lock().await;
        Ok(guard.clone())
    }

    pub async fn next(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
    ) -> Result<GradingSession, ServiceError> {
        self.update(instructor_id, quiz_id, |session| {
            session.next();
            Ok(())
        })
        .await
    }

    pub async fn previous(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
    ) -> Result<GradingSession, ServiceError> {
        self.update(instructor_id, quiz_id, |session| {
            session.previous();
            Ok(())
        })
        .await
    }

    pub async fn select(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
        index: usize,
    ) -> Result<GradingSession, ServiceError> {
        self.update(instructor_id, quiz_id, |session| Ok(session.select(index)?))
            .await
    }

    pub async fn set_draft(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
        grade: String,
        feedback: String,
    ) -> Result<GradingSession, ServiceError> {
        self.update(instructor_id, quiz_id, |session| {
            session.set_draft(grade, feedback);
            Ok(())
        })
        .await
    }

    /// Optionally replaces the draft, then saves it for the current submission.
    ///
    /// A draft passed here stays in the session even when the save is rejected, so the
    /// grader can correct it.
    pub async fn save(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
        draft: Option<(String, String)>,
    ) -> Result<(SaveOutcome, GradingSession), ServiceError> {
        let session = self.session(instructor_id, quiz_id)?;
        let mut guard = session.lock().await;

        if let Some((grade, feedback)) = draft {
            guard.set_draft(grade, feedback);
        }

        let recorder = RepositoryGradeRecorder(self.submissions.as_ref());
        let outcome = guard.save(&recorder).await?;
        info!(
            quiz_id = %quiz_id,
            instructor_id = %instructor_id,
            index = outcome.saved_index,
            advanced = outcome.advanced,
            "grade saved"
        );
        Ok((outcome, guard.clone()))
    }

    /// Drops the session, if any.
    pub fn close(&self, instructor_id: UserId, quiz_id: QuizId) -> bool {
        let closed = self
            .lock_sessions()
            .remove(&(instructor_id, quiz_id))
            .is_some();
        if closed {
            info!(quiz_id = %quiz_id, instructor_id = %instructor_id, "grading session closed");
        }
        closed
    }

    async fn update<F>(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
        apply: F,
    ) -> Result<GradingSession, ServiceError>
    where
        F: FnOnce(&mut GradingSession) -> Result<(), ServiceError>,
    {
        let session = self.session(instructor_id, quiz_id)?;
        let mut guard = session.lock().await;
        apply(&mut *guard)?;
        debug!(
            quiz_id = %quiz_id,
            instructor_id = %instructor_id,
            current = ?guard.current_index(),
            "grading cursor moved"
        );
        Ok(guard.clone())
    }

    fn session(
        &self,
        instructor_id: UserId,
        quiz_id: QuizId,
    ) -> Result<Arc<SessionLock<GradingSession>>, ServiceError> {
        self.lock_sessions()
            .get(&(instructor_id, quiz_id))
            .cloned()
            .ok_or(ServiceError::NotFound("grading session"))
    }

    fn lock_sessions(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<SessionKey, Arc<SessionLock<GradingSession>>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn grading_item(record: SubmissionRecord) -> GradingItem {
    GradingItem {
        submission_id: record.id,
        student_id: record.student_id,
        image_url: record.image_url,
        status: record.status,
        grade: record.grade,
        feedback: record.feedback,
    }
}
