mod common;

use chrono::NaiveDate;
use common::{code, create_profile, insert_quiz, new_quiz, setup_db};
use quizdesk_core::domain::{Grade, GradeUpdate, QuizId, Role, SubmissionId, SubmissionStatus};
use quizdesk_server::repository::{
    CreateQuizError, CreateSubmissionError, NewSubmission, QuizRepository, SeaOrmQuizRepository,
    SeaOrmSubmissionRepository, SubmissionRepository,
};

#[tokio::test]
async fn test_duplicate_quiz_code_is_rejected() {
    let db = setup_db().await;
    let doctor = create_profile(&db, Role::Doctor).await;
    let quizzes = SeaOrmQuizRepository::new(db.clone());

    quizzes
        .create(new_quiz("Anatomy", doctor), code("ABCD"))
        .await
        .expect("first quiz should be created");
    let err = quizzes
        .create(new_quiz("Physiology", doctor), code("ABCD"))
        .await
        .expect_err("second quiz with the same code must fail");

    assert!(matches!(err, CreateQuizError::DuplicateCode(c) if c.as_str() == "ABCD"));
    assert_eq!(
        quizzes.list_by_instructor(doctor).await.expect("list").len(),
        1
    );
}

#[tokio::test]
async fn test_find_by_code_and_exists() {
    let db = setup_db().await;
    let doctor = create_profile(&db, Role::Doctor).await;
    let quizzes = SeaOrmQuizRepository::new(db.clone());
    let quiz = insert_quiz(&db, doctor, "Anatomy", "WXYZ").await;

    assert!(quizzes.exists_by_code(&code("WXYZ")).await.expect("exists"));
    assert!(!quizzes.exists_by_code(&code("ABCD")).await.expect("exists"));

    let found = quizzes
        .find_by_code(&code("wxyz"))
        .await
        .expect("lookup")
        .expect("quiz should be found");
    assert_eq!(found.id, quiz.id);
    assert_eq!(found.title, "Anatomy");
    assert!(quizzes.find_by_id(QuizId::new()).await.expect("lookup").is_none());
}

#[tokio::test]
async fn test_list_all_puts_unscheduled_quizzes_last() {
    let db = setup_db().await;
    let doctor = create_profile(&db, Role::Doctor).await;
    let quizzes = SeaOrmQuizRepository::new(db.clone());
    let day = |d| {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid date")
    };

    let mut early = new_quiz("Early", doctor);
    early.start_time = Some(day(1));
    let mut late = new_quiz("Late", doctor);
    late.start_time = Some(day(20));
    let unscheduled = new_quiz("Unscheduled", doctor);

    quizzes.create(unscheduled, code("AAAA")).await.expect("create");
    quizzes.create(early, code("BBBB")).await.expect("create");
    quizzes.create(late, code("CCCC")).await.expect("create");

    let titles = quizzes
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|q| q.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Late", "Early", "Unscheduled"]);
}

#[tokio::test]
async fn test_second_submission_for_same_quiz_is_rejected() {
    let db = setup_db().await;
    let doctor = create_profile(&db, Role::Doctor).await;
    let student = create_profile(&db, Role::Student).await;
    let quiz = insert_quiz(&db, doctor, "Anatomy", "ABCD").await;
    let submissions = SeaOrmSubmissionRepository::new(db.clone());

    let first = submissions
        .create(NewSubmission {
            quiz_id: quiz.id,
            student_id: student,
            image_url: "/uploads/a.png".to_string(),
        })
        .await
        .expect("first submission should be created");
    assert_eq!(first.status, SubmissionStatus::Pending);
    assert_eq!(first.grade, None);

    let err = submissions
        .create(NewSubmission {
            quiz_id: quiz.id,
            student_id: student,
            image_url: "/uploads/b.png".to_string(),
        })
        .await
        .expect_err("duplicate submission must fail");
    assert!(matches!(err, CreateSubmissionError::AlreadySubmitted { .. }));
}

#[tokio::test]
async fn test_update_grade_persists_fields() {
    let db = setup_db().await;
    let doctor = create_profile(&db, Role::Doctor).await;
    let student = create_profile(&db, Role::Student).await;
    let quiz = insert_quiz(&db, doctor, "Anatomy", "ABCD").await;
    let submissions = SeaOrmSubmissionRepository::new(db.clone());
    let submission = submissions
        .create(NewSubmission {
            quiz_id: quiz.id,
            student_id: student,
            image_url: "/uploads/a.png".to_string(),
        })
        .await
        .expect("create");

    let update = GradeUpdate {
        grade: Grade::new(7).expect("grade"),
        status: SubmissionStatus::Graded,
        feedback: Some("Good".to_string()),
    };
    let updated = submissions
        .update_grade(submission.id, &update)
        .await
        .expect("update")
        .expect("submission exists");
    assert_eq!(updated.grade.map(|g| g.value()), Some(7));
    assert_eq!(updated.status, SubmissionStatus::Graded);

    let reloaded = submissions
        .find_by_quiz_and_student(quiz.id, student)
        .await
        .expect("lookup")
        .expect("submission exists");
    assert_eq!(reloaded.feedback.as_deref(), Some("Good"));

    let missing = submissions
        .update_grade(SubmissionId::new(), &update)
        .await
        .expect("update of a missing row is not an error");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_list_by_quizzes_with_no_ids_is_empty() {
    let db = setup_db().await;
    let submissions = SeaOrmSubmissionRepository::new(db);

    assert!(submissions.list_by_quizzes(&[]).await.expect("list").is_empty());
}
