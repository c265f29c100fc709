pub mod generator;
pub mod model;
pub mod payload;
pub mod prompt;
pub mod review;
pub mod scoring;
pub mod session;

pub use generator::QuizGenerator;
pub use model::{Answer, Difficulty, Question, QuestionKind, QuestionMix, Quiz, QuizRequest, OPTION_COUNT};
pub use review::{review_quiz, OptionMark, ReviewItem};
pub use scoring::{score, Score};
pub use session::{Action, Phase, Session};
