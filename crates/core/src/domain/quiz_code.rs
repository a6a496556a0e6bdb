use std::fmt;
use std::str::FromStr;

use rand::Rng;

use super::DomainError;

/// Symbols a generated code is drawn from. `I`, `O`, `1` and `0` are left out so a code
/// read off a projector cannot be mistyped.
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Short identifier students type to join a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuizCode(String);

impl QuizCode {
    pub const LEN: usize = 4;

    /// Draws `LEN` independent symbols uniformly from [`CODE_ALPHABET`].
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let code = (0..Self::LEN)
            .map(|_| {
                let idx = rng.random_range(0..CODE_ALPHABET.len());
                char::from(CODE_ALPHABET[idx])
            })
            .collect();

        Self(code)
    }

    /// Normalizes user input for lookup: surrounding whitespace is dropped and the rest is
    /// upper-cased. The alphabet is not enforced here, codes created before the generator
    /// existed may contain any symbol.
    pub fn normalize(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyQuizCode);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    /// True when the code has the shape the generator produces.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == Self::LEN && self.0.bytes().all(|b| CODE_ALPHABET.contains(&b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuizCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuizCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
