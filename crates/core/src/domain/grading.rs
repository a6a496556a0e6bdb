//! Sequential grading over the submissions of one quiz.
//!
//! A [`GradingSession`] keeps the ordered submissions, a cursor and the grader's unsaved
//! input. Moving the cursor reloads the input from the newly selected submission. Saving
//! validates the input, persists it through a [`GradeRecorder`] and only then touches the
//! in-memory list.

use async_trait::async_trait;
use thiserror::Error;

use super::{DomainError, Grade, PersistenceError, SubmissionId, SubmissionStatus, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingItem {
    pub submission_id: SubmissionId,
    pub student_id: UserId,
    pub image_url: String,
    pub status: SubmissionStatus,
    pub grade: Option<Grade>,
    pub feedback: Option<String>,
}

/// Grader input as typed, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeDraft {
    pub grade: String,
    pub feedback: String,
}

impl GradeDraft {
    fn from_item(item: &GradingItem) -> Self {
        Self {
            grade: item.grade.map(|g| g.to_string()).unwrap_or_default(),
            feedback: item.feedback.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeUpdate {
    pub grade: Grade,
    pub status: SubmissionStatus,
    pub feedback: Option<String>,
}

#[async_trait]
pub trait GradeRecorder: Send + Sync {
    async fn record_grade(
        &self,
        submission_id: SubmissionId,
        update: &GradeUpdate,
    ) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("no submission is selected")]
    NoCurrentSubmission,
    #[error("submission index {index} is out of range for {len} submissions")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    InvalidGrade(DomainError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub saved_index: usize,
    pub advanced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingSession {
    items: Vec<GradingItem>,
    current: Option<usize>,
    draft: GradeDraft,
}

impl GradingSession {
    pub fn new(items: Vec<GradingItem>) -> Self {
        let current = if items.is_empty() { None } else { Some(0) };
        let draft = items.first().map(GradeDraft::from_item).unwrap_or_default();

        Self {
            items,
            current,
            draft,
        }
    }

    pub fn items(&self) -> &[GradingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&GradingItem> {
        self.current.and_then(|idx| self.items.get(idx))
    }

    pub fn draft(&self) -> &GradeDraft {
        &self.draft
    }

    pub fn set_draft(&mut self, grade: impl Into<String>, feedback: impl Into<String>) {
        self.draft = GradeDraft {
            grade: grade.into(),
            feedback: feedback.into(),
        };
    }

    /// Moves to the following submission. Returns `false` when already on the last one.
    pub fn next(&mut self) -> bool {
        match self.current {
            Some(idx) if idx + 1 < self.items.len() => {
                self.move_to(idx + 1);
                true
            }
            _ => false,
        }
    }

    /// Moves to the preceding submission. Returns `false` when already on the first one.
    pub fn previous(&mut self) -> bool {
        match self.current {
            Some(idx) if idx > 0 => {
                self.move_to(idx - 1);
                true
            }
            _ => false,
        }
    }

    pub fn select(&mut self, index: usize) -> Result<(), GradingError> {
        if index >= self.items.len() {
            return Err(GradingError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        self.move_to(index);
        Ok(())
    }

    /// Persists the draft for the current submission and advances unless it is the last.
    ///
    /// Nothing in the session changes when validation or persistence fails.
    pub async fn save<R>(&mut self, recorder: &R) -> Result<SaveOutcome, GradingError>
    where
        R: GradeRecorder + ?Sized,
    {
        let index = self.current.ok_or(GradingError::NoCurrentSubmission)?;
        let submission_id = self
            .items
            .get(index)
            .map(|item| item.submission_id)
            .ok_or(GradingError::NoCurrentSubmission)?;

        let grade = Grade::parse(&self.draft.grade).map_err(GradingError::InvalidGrade)?;
        let feedback = Some(self.draft.feedback.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        let update = GradeUpdate {
            grade,
            status: SubmissionStatus::Graded,
            feedback,
        };

        recorder.record_grade(submission_id, &update).await?;

        if let Some(item) = self.items.get_mut(index) {
            item.grade = Some(update.grade);
            item.status = update.status;
            item.feedback = update.feedback;
        }

        let advanced = self.next();
        Ok(SaveOutcome {
            saved_index: index,
            advanced,
        })
    }

    fn move_to(&mut self, index: usize) {
        if let Some(item) = self.items.get(index) {
            self.draft = GradeDraft::from_item(item);
            self.current = Some(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<(SubmissionId, GradeUpdate)>>,
        fail: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn saved(&self) -> Vec<(SubmissionId, GradeUpdate)> {
            self.saved.lock().expect("store lock").clone()
        }
    }

    #[async_trait]
    impl GradeRecorder for RecordingStore {
        async fn record_grade(
            &self,
            submission_id: SubmissionId,
            update: &GradeUpdate,
        ) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError::new("database unavailable"));
            }
            self.saved
                .lock()
                .expect("store lock")
                .push((submission_id, update.clone()));
            Ok(())
        }
    }

    fn pending() -> GradingItem {
        GradingItem {
            submission_id: SubmissionId::new(),
            student_id: UserId::new(),
            image_url: "/uploads/sheet.jpg".to_string(),
            status: SubmissionStatus::Pending,
            grade: None,
            feedback: None,
        }
    }

    fn graded(grade: i64, feedback: &str) -> GradingItem {
        GradingItem {
            status: SubmissionStatus::Graded,
            grade: Some(Grade::new(grade).expect("valid grade")),
            feedback: Some(feedback.to_string()),
            ..pending()
        }
    }

    #[test]
    fn empty_session_has_no_current_submission() {
        let mut session = GradingSession::new(Vec::new());

        assert_eq!(session.current_index(), None);
        assert!(!session.next());
        assert!(!session.previous());
        assert_eq!(
            session.select(0),
            Err(GradingError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn initial_draft_reflects_first_submission() {
        let session = GradingSession::new(vec![graded(8, "neat"), pending()]);

        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.draft().grade, "8");
        assert_eq!(session.draft().feedback, "neat");
    }

    #[test]
    fn navigation_is_clamped_at_both_ends() {
        let mut session = GradingSession::new(vec![pending(), pending(), pending()]);

        assert!(!session.previous());
        assert_eq!(session.current_index(), Some(0));

        assert!(session.next());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.current_index(), Some(2));

        assert!(session.previous());
        assert_eq!(session.current_index(), Some(1));
    }

    #[test]
    fn moving_reloads_the_draft() {
        let mut session = GradingSession::new(vec![pending(), graded(6, "check q3")]);
        session.set_draft("9", "unsaved");

        session.select(1).expect("index 1 exists");
        assert_eq!(session.draft().grade, "6");
        assert_eq!(session.draft().feedback, "check q3");

        session.previous();
        assert_eq!(session.draft(), &GradeDraft::default());
    }

    #[tokio::test]
    async fn invalid_grades_are_rejected_without_side_effects() {
        let store = RecordingStore::default();
        let mut session = GradingSession::new(vec![pending(), pending(), pending()]);
        let before = session.clone();

        for input in ["11", "-1", "abc"] {
            session.set_draft(input, "");
            let err = session.save(&store).await.expect_err("grade is invalid");

            assert!(matches!(err, GradingError::InvalidGrade(_)));
            assert_eq!(session.items(), before.items());
            assert_eq!(session.current_index(), Some(0));
        }
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn save_on_non_last_item_advances_by_one() {
        let store = RecordingStore::default();
        let mut session = GradingSession::new(vec![pending(), graded(4, "retry"), pending()]);
        let first_id = session.items()[0].submission_id;

        session.set_draft("7", "  good work ");
        let outcome = session.save(&store).await.expect("save should succeed");

        assert_eq!(
            outcome,
            SaveOutcome {
                saved_index: 0,
                advanced: true
            }
        );
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.draft().grade, "4");
        assert_eq!(session.draft().feedback, "retry");

        let saved_item = &session.items()[0];
        assert_eq!(saved_item.status, SubmissionStatus::Graded);
        assert_eq!(saved_item.grade.map(Grade::value), Some(7));
        assert_eq!(saved_item.feedback.as_deref(), Some("good work"));

        let saved = store.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, first_id);
        assert_eq!(saved[0].1.status, SubmissionStatus::Graded);
    }

    #[tokio::test]
    async fn save_on_last_item_does_not_advance() {
        let store = RecordingStore::default();
        let mut session = GradingSession::new(vec![pending(), pending(), pending()]);
        session.select(2).expect("index 2 exists");

        session.set_draft("7", "");
        let outcome = session.save(&store).await.expect("save should succeed");

        assert!(!outcome.advanced);
        assert_eq!(session.current_index(), Some(2));
        assert_eq!(session.draft().grade, "7");
        assert_eq!(session.items()[2].feedback, None);
    }

    #[tokio::test]
    async fn persistence_failure_leaves_session_unchanged() {
        let store = RecordingStore::failing();
        let mut session = GradingSession::new(vec![pending(), pending()]);
        session.set_draft("5", "ok");
        let before = session.clone();

        let err = session.save(&store).await.expect_err("store is failing");

        assert_eq!(
            err,
            GradingError::Persistence(PersistenceError::new("database unavailable"))
        );
        assert_eq!(session, before);
    }

    #[tokio::test]
    async fn save_without_submissions_fails() {
        let store = RecordingStore::default();
        let mut session = GradingSession::new(Vec::new());

        let err = session.save(&store).await.expect_err("nothing to save");

        assert_eq!(err, GradingError::NoCurrentSubmission);
    }

    #[tokio::test]
    async fn rejected_grade_error_can_be_kept_after_the_attempt() {
        let store = RecordingStore::default();
        let mut session = GradingSession::new(vec![pending()]);
        session.set_draft("12", "");

        let err = session.save(&store).await.expect_err("grade out of range");
        let reported = err.clone();

        assert_eq!(
            reported,
            GradingError::InvalidGrade(DomainError::InvalidGrade("12".to_string()))
        );
        assert_eq!(err, reported);
        assert!(store.saved().is_empty());
    }
}
