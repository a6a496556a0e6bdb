#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use quizdesk_core::domain::{
    CodeOracle, PersistenceError, QuizCode, QuizTitle, Role, UserId,
};
use quizdesk_server::api::AppState;
use quizdesk_server::db::init_pool_and_migrate;
use quizdesk_server::repository::{
    NewProfile, NewQuiz, ProfileRepository, QuizRecord, QuizRepository, SeaOrmProfileRepository,
    SeaOrmQuizRepository, SeaOrmSubmissionRepository,
};
use quizdesk_server::storage::LocalImageStore;
use sea_orm::{ConnectOptions, DatabaseConnection};

/// Fresh in-memory database with the real schema. A single pooled connection keeps every
/// query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    init_pool_and_migrate(options)
        .await
        .expect("in-memory database should migrate")
}

pub async fn create_profile(db: &DatabaseConnection, role: Role) -> UserId {
    let profile = SeaOrmProfileRepository::new(db.clone())
        .create(NewProfile {
            id: UserId::new(),
            full_name: Some(format!("Test {role}")),
            avatar_url: None,
            role,
            academic_id: None,
        })
        .await
        .expect("profile should be created");
    profile.id
}

pub fn code(value: &str) -> QuizCode {
    QuizCode::normalize(value).expect("test code should be non-empty")
}

pub fn new_quiz(title: &str, instructor_id: UserId) -> NewQuiz {
    NewQuiz {
        title: QuizTitle::new(title).expect("test title should be valid"),
        instructor_id,
        start_time: None,
        duration: None,
    }
}

pub async fn insert_quiz(
    db: &DatabaseConnection,
    instructor_id: UserId,
    title: &str,
    quiz_code: &str,
) -> QuizRecord {
    SeaOrmQuizRepository::new(db.clone())
        .create(new_quiz(title, instructor_id), code(quiz_code))
        .await
        .expect("quiz should be created")
}

/// Code source that replays a fixed script and then keeps repeating its last entry.
pub fn scripted_codes(codes: &[&str]) -> impl FnMut() -> QuizCode + Send + 'static {
    let mut queue = codes.iter().map(|c| code(c)).collect::<VecDeque<_>>();
    move || {
        if queue.len() > 1 {
            queue.pop_front().expect("queue is non-empty")
        } else {
            queue.front().cloned().expect("script needs at least one code")
        }
    }
}

/// Oracle whose view of the table is always out of date: every code looks free.
pub struct StaleOracle;

#[async_trait]
impl CodeOracle for StaleOracle {
    async fn code_exists(&self, _code: &QuizCode) -> Result<bool, PersistenceError> {
        Ok(false)
    }
}

pub fn temp_upload_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("quizdesk-{name}-{}", uuid::Uuid::new_v4()))
}

pub fn app_state(
    db: DatabaseConnection,
    upload_dir: &PathBuf,
    public_base_url: &str,
) -> Arc<AppState> {
    let images = Arc::new(LocalImageStore::new(upload_dir.clone(), public_base_url));
    Arc::new(AppState::from_parts(
        Arc::new(SeaOrmProfileRepository::new(db.clone())),
        Arc::new(SeaOrmQuizRepository::new(db.clone())),
        Arc::new(SeaOrmSubmissionRepository::new(db)),
        images,
        None,
    ))
}
