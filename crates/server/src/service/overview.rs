//! Quiz listings and the role-dependent dashboard figures.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use quizdesk_core::domain::{QuizId, SubmissionStatus, UserId};

use super::ServiceError;
use crate::repository::{QuizRecord, QuizRepository, SubmissionRecord, SubmissionRepository};

const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuiz {
    pub quiz: QuizRecord,
    pub submission: Option<SubmissionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorQuiz {
    pub quiz: QuizRecord,
    pub total_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentOverview {
    pub total: usize,
    pub pending: usize,
    pub graded: usize,
    pub average_grade: f64,
    /// Newest submissions with the title of their quiz.
    pub recent: Vec<(SubmissionRecord, Option<String>)>,
    pub upcoming_quiz: Option<QuizRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorOverview {
    pub total_quizzes: usize,
    pub total_submissions: usize,
    pub pending: usize,
    pub graded: usize,
    pub recent_quizzes: Vec<QuizRecord>,
    /// The quiz to grade next and how many of its submissions are pending.
    pub focus_quiz: Option<(QuizRecord, usize)>,
}

/// Mean grade over graded submissions, rounded to one decimal; `0.0` when nothing is graded.
pub fn average_grade(submissions: &[SubmissionRecord]) -> f64 {
    let graded = submissions
        .iter()
        .filter(|s| s.status == SubmissionStatus::Graded)
        .map(|s| s.grade.map_or(0.0, |g| f64::from(g.value())))
        .collect::<Vec<_>>();
    if graded.is_empty() {
        return 0.0;
    }

    let mean = graded.iter().sum::<f64>() / graded.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Quiz with the most pending submissions. Ties go to the quiz listed first. Without any
/// pending work the first quiz is returned with a count of zero.
///
/// `quizzes` is expected newest first.
pub fn focus_quiz<'a>(
    quizzes: &'a [QuizRecord],
    submissions: &[SubmissionRecord],
) -> Option<(&'a QuizRecord, usize)> {
    let mut pending: HashMap<QuizId, usize> = HashMap::new();
    for submission in submissions {
        if submission.status == SubmissionStatus::Pending {
            *pending.entry(submission.quiz_id).or_default() += 1;
        }
    }

    let mut best: Option<(&QuizRecord, usize)> = None;
    for quiz in quizzes {
        let count = pending.get(&quiz.id).copied().unwrap_or(0);
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((quiz, count));
        }
    }

    best.or_else(|| quizzes.first().map(|quiz| (quiz, 0)))
}

/// Earliest quiz starting at or after `now`.
pub fn upcoming_quiz(quizzes: &[QuizRecord], now: NaiveDateTime) -> Option<&QuizRecord> {
    quizzes
        .iter()
        .filter(|quiz| quiz.start_time.is_some_and(|start| start >= now))
        .min_by_key(|quiz| quiz.start_time)
}

fn count_status(submissions: &[SubmissionRecord], status: SubmissionStatus) -> usize {
    submissions.iter().filter(|s| s.status == status).count()
}

#[derive(Clone)]
pub struct Overview {
    quizzes: Arc<dyn QuizRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl Overview {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            quizzes,
            submissions,
        }
    }

    /// Every quiz, latest start first, each with the student's submission if there is one.
    pub async fn student_quizzes(
        &self,
        student_id: UserId,
    ) -> Result<Vec<StudentQuiz>, ServiceError> {
        let quizzes = self.quizzes.list_all().await?;
        let mut by_quiz = self
            .submissions
            .list_by_student(student_id)
            .await?
            .into_iter()
            .map(|submission| (submission.quiz_id, submission))
            .collect::<HashMap<_, _>>();

        Ok(quizzes
            .into_iter()
            .map(|quiz| StudentQuiz {
                submission: by_quiz.remove(&quiz.id),
                quiz,
            })
            .collect())
    }

    /// The instructor's quizzes, newest first, with submission counts.
    pub async fn instructor_quizzes(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<InstructorQuiz>, ServiceError> {
        let quizzes = self.quizzes.list_by_instructor(instructor_id).await?;
        let ids = quizzes.iter().map(|quiz| quiz.id).collect::<Vec<_>>();
        let submissions = self.submissions.list_by_quizzes(&ids).await?;

        let mut counts: HashMap<QuizId, (usize, usize)> = HashMap::new();
        for submission in &submissions {
            let entry = counts.entry(submission.quiz_id).or_default();
            entry.0 += 1;
            if submission.status == SubmissionStatus::Pending {
                entry.1 += 1;
            }
        }

        Ok(quizzes
            .into_iter()
            .map(|quiz| {
                let (total_count, pending_count) =
                    counts.get(&quiz.id).copied().unwrap_or_default();
                InstructorQuiz {
                    quiz,
                    total_count,
                    pending_count,
                }
            })
            .collect())
    }

    pub async fn student_dashboard(
        &self,
        student_id: UserId,
        now: NaiveDateTime,
    ) -> Result<StudentOverview, ServiceError> {
        let submissions = self.submissions.list_by_student(student_id).await?;
        let quizzes = self.quizzes.list_all().await?;
        let titles = quizzes
            .iter()
            .map(|quiz| (quiz.id, quiz.title.as_str()))
            .collect::<HashMap<_, _>>();

        let mut newest = submissions.clone();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent = newest
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|submission| {
                let title = titles.get(&submission.quiz_id).map(|t| t.to_string());
                (submission, title)
            })
            .collect();

        Ok(StudentOverview {
            total: submissions.len(),
            pending: count_status(&submissions, SubmissionStatus::Pending),
            graded: count_status(&submissions, SubmissionStatus::Graded),
            average_grade: average_grade(&submissions),
            recent,
            upcoming_quiz: upcoming_quiz(&quizzes, now).cloned(),
        })
    }

    pub async fn doctor_dashboard(
        &self,
        instructor_id: UserId,
    ) -> Result<DoctorOverview, ServiceError> {
        let quizzes = self.quizzes.list_by_instructor(instructor_id).await?;
        let ids = quizzes.iter().map(|quiz| quiz.id).collect::<Vec<_>>();
        let submissions = self.submissions.list_by_quizzes(&ids).await?;

        let focus_quiz =
            focus_quiz(&quizzes, &submissions).map(|(quiz, count)| (quiz.clone(), count));

        Ok(DoctorOverview {
            total_quizzes: quizzes.len(),
            total_submissions: submissions.len(),
            pending: count_status(&submissions, SubmissionStatus::Pending),
            graded: count_status(&submissions, SubmissionStatus::Graded),
            recent_quizzes: quizzes.iter().take(RECENT_LIMIT).cloned().collect(),
            focus_quiz,
        })
    }
}
