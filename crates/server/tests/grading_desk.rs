mod common;

use std::sync::Arc;

use common::{create_profile, insert_quiz, setup_db};
use quizdesk_core::domain::{QuizId, Role, SubmissionStatus, UserId};
use quizdesk_server::repository::{
    NewSubmission, SeaOrmQuizRepository, SeaOrmSubmissionRepository, SubmissionRecord,
    SubmissionRepository,
};
use quizdesk_server::service::{GradingDesk, ServiceError};
use sea_orm::DatabaseConnection;

struct Fixture {
    desk: GradingDesk,
    submissions: Arc<SeaOrmSubmissionRepository>,
    doctor: UserId,
    quiz_id: QuizId,
    /// In session order, newest first.
    sheets: Vec<SubmissionRecord>,
}

async fn fixture(db: &DatabaseConnection, students: usize) -> Fixture {
    let doctor = create_profile(db, Role::Doctor).await;
    let quiz = insert_quiz(db, doctor, "Pharmacology", "ABCD").await;
    let submissions = Arc::new(SeaOrmSubmissionRepository::new(db.clone()));

    for i in 0..students {
        let student = create_profile(db, Role::Student).await;
        submissions
            .create(NewSubmission {
                quiz_id: quiz.id,
                student_id: student,
                image_url: format!("/uploads/{i}.png"),
            })
            .await
            .expect("submission should be created");
    }
    let sheets = submissions.list_by_quiz(quiz.id).await.expect("list");

    Fixture {
        desk: GradingDesk::new(
            Arc::new(SeaOrmQuizRepository::new(db.clone())),
            submissions.clone(),
        ),
        submissions,
        doctor,
        quiz_id: quiz.id,
        sheets,
    }
}

#[tokio::test]
async fn test_open_starts_at_first_submission() {
    let db = setup_db().await;
    let f = fixture(&db, 3).await;

    let session = f.desk.open(f.doctor, f.quiz_id).await.expect("open");

    assert_eq!(session.len(), 3);
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(
        session.current().map(|item| item.submission_id),
        Some(f.sheets[0].id)
    );
    assert_eq!(session.draft().grade, "");
}

#[tokio::test]
async fn test_only_the_owner_can_open() {
    let db = setup_db().await;
    let f = fixture(&db, 1).await;
    let other = create_profile(&db, Role::Doctor).await;

    let err = f.desk.open(other, f.quiz_id).await.expect_err("not the owner");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = f.desk.view(other, f.quiz_id).await.expect_err("no session");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_save_persists_and_advances() {
    let db = setup_db().await;
    let f = fixture(&db, 3).await;
    f.desk.open(f.doctor, f.quiz_id).await.expect("open");

    let (outcome, session) = f
        .desk
        .save(
            f.doctor,
            f.quiz_id,
            Some(("7".to_string(), "  Good  ".to_string())),
        )
        .await
        .expect("save");

    assert_eq!(outcome.saved_index, 0);
    assert!(outcome.advanced);
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.draft().grade, "");

    let stored = f
        .submissions
        .find_by_quiz_and_student(f.quiz_id, f.sheets[0].student_id)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stored.status, SubmissionStatus::Graded);
    assert_eq!(stored.grade.map(|g| g.value()), Some(7));
    assert_eq!(stored.feedback.as_deref(), Some("Good"));
}

#[tokio::test]
async fn test_save_on_last_submission_stays_put() {
    let db = setup_db().await;
    let f = fixture(&db, 3).await;
    f.desk.open(f.doctor, f.quiz_id).await.expect("open");
    f.desk.select(f.doctor, f.quiz_id, 2).await.expect("select");

    let (outcome, session) = f
        .desk
        .save(f.doctor, f.quiz_id, Some(("10".to_string(), String::new())))
        .await
        .expect("save");

    assert!(!outcome.advanced);
    assert_eq!(session.current_index(), Some(2));
    assert_eq!(session.draft().grade, "10");
    let stored = f
        .submissions
        .find_by_quiz_and_student(f.quiz_id, f.sheets[2].student_id)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stored.feedback, None);
}

#[tokio::test]
async fn test_invalid_grade_changes_nothing() {
    let db = setup_db().await;
    let f = fixture(&db, 2).await;
    f.desk.open(f.doctor, f.quiz_id).await.expect("open");

    for input in ["11", "-1", "abc", "7.5", ""] {
        let err = f
            .desk
            .save(f.doctor, f.quiz_id, Some((input.to_string(), String::new())))
            .await
            .expect_err("grade must be rejected");
        assert!(matches!(err, ServiceError::InvalidGrade(_)), "input {input:?}");
    }

    let session = f.desk.view(f.doctor, f.quiz_id).await.expect("view");
    assert_eq!(session.current_index(), Some(0));
    let stored = f
        .submissions
        .find_by_quiz_and_student(f.quiz_id, f.sheets[0].student_id)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stored.status, SubmissionStatus::Pending);
    assert_eq!(stored.grade, None);
}

#[tokio::test]
async fn test_navigation_is_clamped() {
    let db = setup_db().await;
    let f = fixture(&db, 2).await;
    f.desk.open(f.doctor, f.quiz_id).await.expect("open");

    let session = f.desk.previous(f.doctor, f.quiz_id).await.expect("previous");
    assert_eq!(session.current_index(), Some(0));

    f.desk.next(f.doctor, f.quiz_id).await.expect("next");
    let session = f.desk.next(f.doctor, f.quiz_id).await.expect("next");
    assert_eq!(session.current_index(), Some(1));

    let err = f
        .desk
        .select(f.doctor, f.quiz_id, 5)
        .await
        .expect_err("out of range");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_empty_session_cannot_save() {
    let db = setup_db().await;
    let f = fixture(&db, 0).await;

    let session = f.desk.open(f.doctor, f.quiz_id).await.expect("open");
    assert!(session.is_empty());
    assert_eq!(session.current_index(), None);

    let err = f
        .desk
        .save(f.doctor, f.quiz_id, Some(("5".to_string(), String::new())))
        .await
        .expect_err("nothing to grade");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_reopening_reloads_persisted_grades() {
    let db = setup_db().await;
    let f = fixture(&db, 2).await;
    f.desk.open(f.doctor, f.quiz_id).await.expect("open");
    f.desk
        .save(f.doctor, f.quiz_id, Some(("4".to_string(), "Redo".to_string())))
        .await
        .expect("save");

    let session = f.desk.open(f.doctor, f.quiz_id).await.expect("reopen");
    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.draft().grade, "4");
    assert_eq!(session.draft().feedback, "Redo");
    assert!(f.desk.close(f.doctor, f.quiz_id));
}
