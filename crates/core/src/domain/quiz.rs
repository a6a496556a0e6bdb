use super::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuizTitle(String);

impl QuizTitle {
    pub const MAX_LEN: usize = 200;

    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(DomainError::EmptyQuizTitle);
        }

        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(DomainError::InvalidQuizTitleLength(len));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Length of a scheduled quiz in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuizDuration(u32);

impl QuizDuration {
    pub fn from_minutes(minutes: i64) -> Result<Self, DomainError> {
        u32::try_from(minutes)
            .ok()
            .filter(|m| *m >= 1)
            .map(Self)
            .ok_or(DomainError::InvalidQuizDuration(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        let title = QuizTitle::new("  Cybersecurity Midterm ").expect("valid title");

        assert_eq!(title.as_str(), "Cybersecurity Midterm");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(QuizTitle::new("   "), Err(DomainError::EmptyQuizTitle));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let long = "x".repeat(QuizTitle::MAX_LEN + 1);

        assert_eq!(
            QuizTitle::new(long),
            Err(DomainError::InvalidQuizTitleLength(201))
        );
    }

    #[test]
    fn duration_must_be_positive() {
        assert_eq!(QuizDuration::from_minutes(60).map(QuizDuration::minutes), Ok(60));
        assert_eq!(
            QuizDuration::from_minutes(0),
            Err(DomainError::InvalidQuizDuration(0))
        );
    }
}
