//! Conversions from service records to wire types.

use quizdesk_api_types::{
    DoctorDashboard, FocusQuiz, GradingItemResponse, GradingViewResponse, InstructorQuizSummary,
    ProfileResponse, QuizResponse, RecentSubmission, StudentDashboard, StudentQuizSummary,
    SubmissionResponse,
};
use quizdesk_core::domain::{GradingSession, QuizId};

use crate::repository::{ProfileRecord, QuizRecord, SubmissionRecord};
use crate::service::{DoctorOverview, InstructorQuiz, StudentOverview, StudentQuiz};

pub fn profile_response(profile: &ProfileRecord) -> ProfileResponse {
    ProfileResponse {
        id: profile.id.to_string(),
        full_name: profile.full_name.clone(),
        avatar_url: profile.avatar_url.clone(),
        role: profile.role.to_string(),
        academic_id: profile.academic_id.clone(),
    }
}

pub fn quiz_response(quiz: &QuizRecord) -> QuizResponse {
    QuizResponse {
        id: quiz.id.to_string(),
        title: quiz.title.clone(),
        code: quiz.code.to_string(),
        instructor_id: quiz.instructor_id.to_string(),
        start_time: quiz.start_time,
        duration_mins: quiz.duration.map(|d| d.minutes()),
        created_at: quiz.created_at,
    }
}

pub fn submission_response(submission: &SubmissionRecord) -> SubmissionResponse {
    SubmissionResponse {
        id: submission.id.to_string(),
        quiz_id: submission.quiz_id.to_string(),
        student_id: submission.student_id.to_string(),
        image_url: submission.image_url.clone(),
        status: submission.status.to_string(),
        grade: submission.grade.map(|g| g.value()),
        feedback: submission.feedback.clone(),
        created_at: submission.created_at,
    }
}

pub fn instructor_quiz_summary(entry: &InstructorQuiz) -> InstructorQuizSummary {
    InstructorQuizSummary {
        quiz: quiz_response(&entry.quiz),
        total_count: entry.total_count,
        pending_count: entry.pending_count,
    }
}

pub fn student_quiz_summary(entry: &StudentQuiz) -> StudentQuizSummary {
    StudentQuizSummary {
        quiz: quiz_response(&entry.quiz),
        submission: entry.submission.as_ref().map(submission_response),
    }
}

pub fn grading_view(quiz_id: QuizId, session: &GradingSession) -> GradingViewResponse {
    GradingViewResponse {
        quiz_id: quiz_id.to_string(),
        items: session
            .items()
            .iter()
            .map(|item| GradingItemResponse {
                submission_id: item.submission_id.to_string(),
                student_id: item.student_id.to_string(),
                image_url: item.image_url.clone(),
                status: item.status.to_string(),
                grade: item.grade.map(|g| g.value()),
                feedback: item.feedback.clone(),
            })
            .collect(),
        current_index: session.current_index(),
        draft_grade: session.draft().grade.clone(),
        draft_feedback: session.draft().feedback.clone(),
    }
}

pub fn student_dashboard(overview: &StudentOverview) -> StudentDashboard {
    StudentDashboard {
        total: overview.total,
        pending: overview.pending,
        graded: overview.graded,
        average_grade: overview.average_grade,
        recent: overview
            .recent
            .iter()
            .map(|(submission, quiz_title)| RecentSubmission {
                submission: submission_response(submission),
                quiz_title: quiz_title.clone(),
            })
            .collect(),
        upcoming_quiz: overview.upcoming_quiz.as_ref().map(quiz_response),
    }
}

pub fn doctor_dashboard(overview: &DoctorOverview) -> DoctorDashboard {
    DoctorDashboard {
        total_quizzes: overview.total_quizzes,
        total_submissions: overview.total_submissions,
        pending: overview.pending,
        graded: overview.graded,
        recent_quizzes: overview.recent_quizzes.iter().map(quiz_response).collect(),
        focus_quiz: overview
            .focus_quiz
            .as_ref()
            .map(|(quiz, pending_count)| FocusQuiz {
                quiz: quiz_response(quiz),
                pending_count: *pending_count,
            }),
    }
}
