use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::QuizSettings;
use crate::error::QuizError;

/// Number of options every multiple-choice question carries.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Self::Easy),
            "medium" | "m" => Ok(Self::Medium),
            "hard" | "h" => Ok(Self::Hard),
            other => Err(format!("Unknown difficulty '{}'. Supported: easy, medium, hard", other)),
        }
    }
}

/// Which question types a quiz may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMix {
    #[default]
    MultipleChoice,
    /// Multiple choice, short answer and fill-in-the-blank together.
    Mixed,
}

/// What the user asked for on the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: usize,
    pub mix: QuestionMix,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, difficulty: Difficulty, count: usize) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            count,
            mix: QuestionMix::default(),
        }
    }

    #[must_use]
    pub fn with_mix(mut self, mix: QuestionMix) -> Self {
        self.mix = mix;
        self
    }

    pub fn trimmed_topic(&self) -> &str {
        self.topic.trim()
    }

    /// Reject requests that must never reach the service.
    pub fn validate(&self, settings: &QuizSettings) -> Result<(), QuizError> {
        if self.trimmed_topic().is_empty() {
            return Err(QuizError::Validation("Please enter a topic.".to_string()));
        }
        if self.count < settings.min_questions || self.count > settings.max_questions {
            return Err(QuizError::Validation(format!(
                "Number of questions must be between {} and {}.",
                settings.min_questions, settings.max_questions
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly `OPTION_COUNT` options; `correct_index` is always in range.
    MultipleChoice { options: Vec<String>, correct_index: usize },
    ShortAnswer { correct_text: String },
    FillInBlank { correct_text: String },
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MultipleChoice { .. } => "multiple choice",
            Self::ShortAnswer { .. } => "short answer",
            Self::FillInBlank { .. } => "fill in the blank",
        }
    }

    /// The correct answer as it should be shown to the user.
    pub fn correct_display(&self) -> &str {
        match self {
            Self::MultipleChoice { options, correct_index } => &options[*correct_index],
            Self::ShortAnswer { correct_text } | Self::FillInBlank { correct_text } => correct_text,
        }
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::MultipleChoice { options, .. } => Some(options),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub kind: QuestionKind,
    pub explanation: Option<String>,
}

impl Question {
    /// # Panics
    /// If `correct_index` is not below `OPTION_COUNT`.
    pub fn multiple_choice<S: Into<String>>(prompt: impl Into<String>, options: [S; OPTION_COUNT], correct_index: usize) -> Self {
        assert!(correct_index < OPTION_COUNT, "correct index {correct_index} out of range");
        Self {
            prompt: prompt.into(),
            kind: QuestionKind::MultipleChoice {
                options: options.into_iter().map(Into::into).collect(),
                correct_index,
            },
            explanation: None,
        }
    }

    pub fn short_answer(prompt: impl Into<String>, correct_text: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind: QuestionKind::ShortAnswer { correct_text: correct_text.into() },
            explanation: None,
        }
    }

    pub fn fill_in_blank(prompt: impl Into<String>, correct_text: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind: QuestionKind::FillInBlank { correct_text: correct_text.into() },
            explanation: None,
        }
    }

    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// A generated quiz. Never empty, never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    request: QuizRequest,
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(request: QuizRequest, questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuiz);
        }
        Ok(Self { request, questions })
    }

    pub fn request(&self) -> &QuizRequest {
        &self.request
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// The user's answer for one question slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Answer {
    #[default]
    Unanswered,
    Choice(usize),
    Text(String),
}

impl Answer {
    /// `len` unanswered slots.
    pub fn blank_sheet(len: usize) -> Vec<Answer> {
        vec![Answer::Unanswered; len]
    }

    /// Blank text counts as unanswered.
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Unanswered => false,
            Self::Choice(_) => true,
            Self::Text(text) => !text.trim().is_empty(),
        }
    }
}
