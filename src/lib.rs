pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod interceptors;
pub mod json_utils;
pub mod quiz;

// Convenient re-exports
pub use config::QuizSettings;
pub use error::{AIError, ProviderError, QuizError, SessionError};
pub use quiz::{Action, Answer, Difficulty, Phase, QuestionMix, Quiz, QuizGenerator, QuizRequest, Session};
