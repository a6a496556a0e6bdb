//! Creating quizzes under a fresh access code and resolving codes typed by students.

use std::sync::Arc;

use async_trait::async_trait;
use quizdesk_core::domain::{
    CodeGenerator, CodeOracle, CodeSource, PersistenceError, QuizCode, RandomCodeSource,
};
use tracing::{info, warn};

use super::ServiceError;
use crate::repository::{CreateQuizError, NewQuiz, QuizRecord, QuizRepository};

/// How many times a create that lost a code race is regenerated and retried.
pub const RACE_RETRIES: u32 = 1;

/// Uniqueness check backed by the quiz table.
pub struct RepositoryCodeOracle<'a>(pub &'a dyn QuizRepository);

#[async_trait]
impl CodeOracle for RepositoryCodeOracle<'_> {
    async fn code_exists(&self, code: &QuizCode) -> Result<bool, PersistenceError> {
        self.0
            .exists_by_code(code)
            .await
            .map_err(|err| PersistenceError::new(format!("{err:#}")))
    }
}

#[derive(Clone)]
pub struct QuizAccess {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizAccess {
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    pub async fn create_quiz(&self, new_quiz: NewQuiz) -> Result<QuizRecord, ServiceError> {
        let mut generator = CodeGenerator::<RandomCodeSource>::new();
        let oracle = RepositoryCodeOracle(self.quizzes.as_ref());
        self.create_quiz_with(new_quiz, &mut generator, &oracle).await
    }

    /// Generates a code, then inserts. The unique constraint on the code column is the final
    /// arbiter: losing the insert to a concurrent creator triggers a fresh generation, at most
    /// [`RACE_RETRIES`] times, before `RaceCollision` is reported.
    pub async fn create_quiz_with<S, O>(
        &self,
        new_quiz: NewQuiz,
        generator: &mut CodeGenerator<S>,
        oracle: &O,
    ) -> Result<QuizRecord, ServiceError>
    where
        S: CodeSource,
        O: CodeOracle + ?Sized,
    {
        let mut round = 0;
        loop {
            let code = generator.generate(oracle).await?;

            match self.quizzes.create(new_quiz.clone(), code).await {
                Ok(quiz) => {
                    info!(
                        quiz_id = %quiz.id,
                        code = %quiz.code,
                        instructor_id = %quiz.instructor_id,
                        "quiz created"
                    );
                    return Ok(quiz);
                }
                Err(CreateQuizError::DuplicateCode(code)) if round < RACE_RETRIES => {
                    warn!(code = %code, "quiz code taken between check and insert, regenerating");
                    round += 1;
                }
                Err(CreateQuizError::DuplicateCode(code)) => {
                    warn!(code = %code, "quiz code race lost again, giving up");
                    return Err(ServiceError::RaceCollision(code));
                }
                Err(CreateQuizError::Other(err)) => return Err(err.into()),
            }
        }
    }

    /// Resolves user input to a quiz. Blank and unknown codes are both `InvalidCode`.
    pub async fn redeem(&self, input: &str) -> Result<QuizRecord, ServiceError> {
        let code = QuizCode::normalize(input).map_err(|_| ServiceError::InvalidCode)?;

        match self.quizzes.find_by_code(&code).await? {
            Some(quiz) => {
                info!(quiz_id = %quiz.id, code = %code, "quiz code redeemed");
                Ok(quiz)
            }
            None => {
                info!(code = %code, "unknown quiz code");
                Err(ServiceError::InvalidCode)
            }
        }
    }
}
