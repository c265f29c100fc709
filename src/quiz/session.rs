//! The quiz session as an explicit state machine.
//!
//! Every change goes through `Session::dispatch` with an `Action`, so each
//! transition can be tested without a client. `Session::generate` is the
//! only async entry point; it wraps one generation call in
//! `BeginGeneration` and `GenerationSucceeded`/`GenerationFailed`.

use tracing::{debug, info, warn};

use super::generator::QuizGenerator;
use super::model::{Answer, Difficulty, QuestionMix, Quiz, QuizRequest};
use super::review::{review_quiz, ReviewItem};
use super::scoring::{score, Score};
use crate::config::QuizSettings;
use crate::core::LowLevelClient;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    FormEntry,
    /// `review` is set when replaying a submitted quiz; answers are frozen.
    QuizTaking { review: bool },
    Result,
}

impl Phase {
    fn describe(self) -> &'static str {
        match self {
            Self::FormEntry => "entering quiz settings",
            Self::QuizTaking { review: false } => "taking a quiz",
            Self::QuizTaking { review: true } => "reviewing a quiz",
            Self::Result => "viewing results",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetTopic(String),
    SetDifficulty(Difficulty),
    SetCount(usize),
    SetMix(QuestionMix),
    BeginGeneration,
    GenerationSucceeded(Quiz),
    GenerationFailed(String),
    RecordAnswer { index: usize, answer: Answer },
    Submit,
    Review,
    FinishReview,
    Reset,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Self::SetTopic(_) => "change the topic",
            Self::SetDifficulty(_) => "change the difficulty",
            Self::SetCount(_) => "change the question count",
            Self::SetMix(_) => "change the question mix",
            Self::BeginGeneration => "generate a quiz",
            Self::GenerationSucceeded(_) | Self::GenerationFailed(_) => "finish generating",
            Self::RecordAnswer { .. } => "record an answer",
            Self::Submit => "submit",
            Self::Review => "review",
            Self::FinishReview => "finish reviewing",
            Self::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    settings: QuizSettings,
    topic: String,
    difficulty: Difficulty,
    count: usize,
    mix: QuestionMix,
    phase: Phase,
    loading: bool,
    error: Option<String>,
    quiz: Option<Quiz>,
    answers: Vec<Answer>,
    score: Option<Score>,
}

impl Session {
    pub fn new(settings: QuizSettings) -> Self {
        Self {
            topic: String::new(),
            difficulty: Difficulty::default(),
            count: settings.default_count,
            mix: QuestionMix::default(),
            phase: Phase::FormEntry,
            loading: false,
            error: None,
            quiz: None,
            answers: Vec::new(),
            score: None,
            settings,
        }
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_review(&self) -> bool {
        self.phase == Phase::QuizTaking { review: true }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mix(&self) -> QuestionMix {
        self.mix
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn unanswered_count(&self) -> usize {
        self.answers.iter().filter(|a| !a.is_answered()).count()
    }

    /// The request the form currently describes.
    pub fn request(&self) -> QuizRequest {
        QuizRequest::new(self.topic.clone(), self.difficulty, self.count).with_mix(self.mix)
    }

    /// Per-question correctness, available once the quiz is submitted.
    pub fn review_items(&self) -> Option<Vec<ReviewItem<'_>>> {
        match (self.phase, &self.quiz) {
            (Phase::Result | Phase::QuizTaking { review: true }, Some(quiz)) => Some(review_quiz(quiz, &self.answers)),
            _ => None,
        }
    }

    fn reject(&self, action: &Action) -> SessionError {
        SessionError::InvalidTransition { action: action.verb(), phase: self.phase.describe() }
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), SessionError> {
        debug!(action = action.verb(), phase = self.phase.describe(), "Dispatching session action");

        match (self.phase, action) {
            (_, Action::Reset) => {
                self.reset();
                Ok(())
            }

            (Phase::FormEntry, Action::SetTopic(topic)) => {
                self.topic = topic;
                Ok(())
            }
            (Phase::FormEntry, Action::SetDifficulty(difficulty)) => {
                self.difficulty = difficulty;
                Ok(())
            }
            (Phase::FormEntry, Action::SetCount(count)) => {
                self.count = count;
                Ok(())
            }
            (Phase::FormEntry, Action::SetMix(mix)) => {
                self.mix = mix;
                Ok(())
            }

            (Phase::FormEntry, Action::BeginGeneration) => {
                if self.loading {
                    return Err(SessionError::Busy);
                }
                self.loading = true;
                self.error = None;
                Ok(())
            }
            (Phase::FormEntry, action @ Action::GenerationSucceeded(_)) if !self.loading => Err(self.reject(&action)),
            (Phase::FormEntry, Action::GenerationSucceeded(quiz)) => {
                info!(question_count = quiz.len(), "Quiz installed");
                self.answers = Answer::blank_sheet(quiz.len());
                self.quiz = Some(quiz);
                self.score = None;
                self.error = None;
                self.loading = false;
                self.phase = Phase::QuizTaking { review: false };
                Ok(())
            }
            (Phase::FormEntry, action @ Action::GenerationFailed(_)) if !self.loading => Err(self.reject(&action)),
            (Phase::FormEntry, Action::GenerationFailed(message)) => {
                warn!(error = %message, "Quiz generation failed");
                self.quiz = None;
                self.answers.clear();
                self.loading = false;
                self.error = Some(message);
                Ok(())
            }

            (Phase::QuizTaking { review: true }, Action::RecordAnswer { index, .. }) => {
                debug!(index, "Ignoring answer in review mode");
                Ok(())
            }
            (Phase::QuizTaking { review: false }, Action::RecordAnswer { index, answer }) => {
                let len = self.answers.len();
                let slot = self
                    .answers
                    .get_mut(index)
                    .ok_or(SessionError::AnswerOutOfRange { index, len })?;
                *slot = answer;
                Ok(())
            }

            (Phase::QuizTaking { review: false }, Action::Submit) => {
                let unanswered = self.unanswered_count();
                if self.settings.require_all_answered && unanswered > 0 {
                    return Err(SessionError::Incomplete { unanswered });
                }
                let quiz = self.quiz.as_ref().ok_or_else(|| self.reject(&Action::Submit))?;
                let result = score(quiz, &self.answers);
                info!(correct = result.correct, total = result.total, "Quiz submitted");
                self.score = Some(result);
                self.phase = Phase::Result;
                Ok(())
            }

            (Phase::Result, Action::Review) => {
                self.phase = Phase::QuizTaking { review: true };
                Ok(())
            }
            (Phase::QuizTaking { review: true }, Action::FinishReview) => {
                self.phase = Phase::Result;
                Ok(())
            }

            (_, action) => Err(self.reject(&action)),
        }
    }

    /// Back to `Session::new` with the same settings. Only the topic may
    /// survive, and only when `keep_topic_on_reset` is set.
    fn reset(&mut self) {
        let topic = std::mem::take(&mut self.topic);
        *self = Self::new(self.settings.clone());
        if self.settings.keep_topic_on_reset {
            self.topic = topic;
        }
    }

    /// Generate a quiz for the current form and install it.
    ///
    /// Failures are recorded in `error()` rather than returned: the session
    /// stays in form entry with no quiz. A request that fails validation never
    /// reaches the client. The `Err` case is reserved for calling this in the
    /// wrong phase or while another generation is in flight.
    pub async fn generate<C: LowLevelClient>(&mut self, generator: &QuizGenerator<C>) -> Result<(), SessionError> {
        if self.phase != Phase::FormEntry {
            return Err(self.reject(&Action::BeginGeneration));
        }
        if self.loading {
            return Err(SessionError::Busy);
        }

        let request = self.request();
        if let Err(e) = generator.validate(&request) {
            debug!(error = %e, "Request rejected before generation");
            self.error = Some(e.to_string());
            return Ok(());
        }

        self.dispatch(Action::BeginGeneration)?;
        match generator.generate(&request).await {
            Ok(quiz) => self.dispatch(Action::GenerationSucceeded(quiz)),
            Err(e) => self.dispatch(Action::GenerationFailed(e.to_string())),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(QuizSettings::default())
    }
}
