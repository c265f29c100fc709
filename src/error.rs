use thiserror::Error;

/// Failures while producing a quiz. The `Display` text of every variant is
/// what the session shows to the user.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to generate quiz: {0}")]
    Ai(#[from] AIError),
    #[error("Failed to generate quiz: {0}")]
    Generation(String),
    #[error("Failed to read the generated quiz: {0}. Raw response: {1}")]
    Parse(String, String),
    #[error("No questions were generated. Please try a more specific topic.")]
    EmptyQuiz,
}

impl QuizError {
    pub fn parse(source: impl std::fmt::Display, raw: &str) -> Self {
        QuizError::Parse(source.to_string(), truncate_raw(raw))
    }
}

fn truncate_raw(raw: &str) -> String {
    const LIMIT: usize = 200;
    match raw.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Claude API error: {0}")]
    Claude(ProviderError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(ProviderError),
    #[error("Gemini API error: {0}")]
    Gemini(ProviderError),
    #[error("Mock client error: {0}")]
    Mock(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
    #[error("API key {0} not found")]
    MissingKey(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: &'static str },
    #[error("A quiz is already being generated")]
    Busy,
    #[error("Please answer all questions before submitting ({unanswered} left)")]
    Incomplete { unanswered: usize },
    #[error("Question {index} does not exist (quiz has {len})")]
    AnswerOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_truncates_long_responses() {
        let raw = "x".repeat(500);
        let err = QuizError::parse("expected value", &raw);
        match err {
            QuizError::Parse(_, shown) => assert_eq!(shown.len(), 203),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_quiz_message_suggests_specific_topic() {
        assert!(QuizError::EmptyQuiz.to_string().contains("more specific topic"));
    }
}
