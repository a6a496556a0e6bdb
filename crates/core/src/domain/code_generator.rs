use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use super::{PersistenceError, QuizCode};

/// Number of candidate codes tried before giving up.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Answers whether a code is already held by a quiz.
#[async_trait]
pub trait CodeOracle: Send + Sync {
    async fn code_exists(&self, code: &QuizCode) -> Result<bool, PersistenceError>;
}

/// Supplies candidate codes to the generator.
pub trait CodeSource: Send {
    fn next_code(&mut self) -> QuizCode;
}

/// Uniform draws from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn next_code(&mut self) -> QuizCode {
        QuizCode::random(&mut rand::rng())
    }
}

impl<F> CodeSource for F
where
    F: FnMut() -> QuizCode + Send,
{
    fn next_code(&mut self) -> QuizCode {
        self()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeGenerationError {
    #[error("no unused quiz code found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Bounded retry loop producing a code no existing quiz holds.
///
/// The check is advisory: another writer may take the same code between the check and the
/// insert, so callers must still handle a unique violation on create.
#[derive(Debug, Clone)]
pub struct CodeGenerator<S = RandomCodeSource> {
    source: S,
    max_attempts: u32,
}

impl CodeGenerator<RandomCodeSource> {
    pub fn new() -> Self {
        Self::with_source(RandomCodeSource)
    }
}

impl Default for CodeGenerator<RandomCodeSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CodeSource> CodeGenerator<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }

    pub async fn generate<O>(&mut self, oracle: &O) -> Result<QuizCode, CodeGenerationError>
    where
        O: CodeOracle + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.next_code();

            if !oracle.code_exists(&candidate).await? {
                debug!(attempt, code = %candidate, "quiz code accepted");
                return Ok(candidate);
            }

            debug!(attempt, code = %candidate, "quiz code already taken");
        }

        warn!(
            attempts = self.max_attempts,
            "quiz code generation exhausted"
        );
        Err(CodeGenerationError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn code(value: &str) -> QuizCode {
        QuizCode::normalize(value).expect("test code should be non-empty")
    }

    /// Reports a collision for the first `collisions` lookups.
    struct CollidingOracle {
        collisions: u32,
        calls: AtomicU32,
    }

    impl CollidingOracle {
        fn new(collisions: u32) -> Self {
            Self {
                collisions,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CodeOracle for CollidingOracle {
        async fn code_exists(&self, _code: &QuizCode) -> Result<bool, PersistenceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(call <= self.collisions)
        }
    }

    struct ExistingCodes(HashSet<String>);

    #[async_trait]
    impl CodeOracle for ExistingCodes {
        async fn code_exists(&self, code: &QuizCode) -> Result<bool, PersistenceError> {
            Ok(self.0.contains(code.as_str()))
        }
    }

    struct BrokenOracle;

    #[async_trait]
    impl CodeOracle for BrokenOracle {
        async fn code_exists(&self, _code: &QuizCode) -> Result<bool, PersistenceError> {
            Err(PersistenceError::new("connection reset"))
        }
    }

    #[tokio::test]
    async fn generated_code_is_canonical() {
        let oracle = CollidingOracle::new(0);
        let code = CodeGenerator::new()
            .generate(&oracle)
            .await
            .expect("free oracle should accept the first code");

        assert!(code.is_canonical());
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn always_taken_oracle_exhausts_after_exactly_ten_attempts() {
        let oracle = CollidingOracle::new(u32::MAX);

        let err = CodeGenerator::new()
            .generate(&oracle)
            .await
            .expect_err("every code is taken");

        assert_eq!(err, CodeGenerationError::Exhausted { attempts: 10 });
        assert_eq!(oracle.calls(), 10);
    }

    #[tokio::test]
    async fn succeeds_on_the_tenth_attempt() {
        let oracle = CollidingOracle::new(9);

        let code = CodeGenerator::new()
            .generate(&oracle)
            .await
            .expect("tenth attempt should be accepted");

        assert!(code.is_canonical());
        assert_eq!(oracle.calls(), 10);
    }

    #[tokio::test]
    async fn never_returns_a_persisted_code() {
        let taken = ["ABCD", "EFGH", "JKLM"];
        let oracle = ExistingCodes(taken.iter().map(|c| c.to_string()).collect());
        let mut script = taken
            .iter()
            .copied()
            .chain(["NPQR"])
            .map(code)
            .collect::<Vec<_>>()
            .into_iter();
        let mut generator = CodeGenerator::with_source(move || {
            script.next().expect("script should not run dry")
        });

        let code = generator
            .generate(&oracle)
            .await
            .expect("fourth candidate is free");

        assert_eq!(code.as_str(), "NPQR");
    }

    #[tokio::test]
    async fn oracle_failure_is_propagated() {
        let err = CodeGenerator::new()
            .generate(&BrokenOracle)
            .await
            .expect_err("oracle failure should surface");

        assert_eq!(
            err,
            CodeGenerationError::Persistence(PersistenceError::new("connection reset"))
        );
    }
}
