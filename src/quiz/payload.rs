//! The JSON shape requested from the model, and its conversion into the
//! typed quiz model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::model::{Question, QuestionKind, QuestionMix, OPTION_COUNT};

/// Marks the gap in a fill-in-the-blank question.
pub const BLANK_MARKER: &str = "___";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Quiz", description = "A generated quiz")]
pub struct QuizPayload {
    /// The quiz questions, in the order they should be asked
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    /// The question text shown to the player
    pub question: String,
    /// The kind of question
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
    /// Exactly 4 answer options, only for multiple choice questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Multiple choice: the zero-based index of the correct option.
    /// Other types: the exact correct answer text.
    pub correct_answer: CorrectAnswer,
    /// A short explanation of why the answer is correct
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    ShortAnswer,
    FillInBlank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Index(i64),
    Text(String),
}

impl QuizPayload {
    /// Check every invariant and convert. The error string names the
    /// offending question (1-based). An empty list converts to an empty vec;
    /// `Quiz::new` decides what that means.
    pub fn into_questions(self, mix: QuestionMix) -> Result<Vec<Question>, String> {
        self.questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| q.into_question(mix).map_err(|msg| format!("question {}: {}", i + 1, msg)))
            .collect()
    }
}

impl QuestionPayload {
    fn resolved_type(&self) -> QuestionType {
        match self.question_type {
            Some(t) => t,
            None if self.options.is_some() => QuestionType::MultipleChoice,
            None if self.question.contains(BLANK_MARKER) => QuestionType::FillInBlank,
            None => QuestionType::ShortAnswer,
        }
    }

    pub fn into_question(self, mix: QuestionMix) -> Result<Question, String> {
        let prompt = self.question.trim().to_string();
        if prompt.is_empty() {
            return Err("question text is empty".to_string());
        }

        let question_type = self.resolved_type();
        if mix == QuestionMix::MultipleChoice && question_type != QuestionType::MultipleChoice {
            return Err("expected a multiple choice question".to_string());
        }

        let kind = match question_type {
            QuestionType::MultipleChoice => {
                let options = self.options.ok_or("multiple choice question has no options")?;
                if options.len() != OPTION_COUNT {
                    return Err(format!("expected {} options, got {}", OPTION_COUNT, options.len()));
                }
                let correct_index = resolve_index(&self.correct_answer, &options)?;
                QuestionKind::MultipleChoice { options, correct_index }
            }
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer { correct_text: answer_text(self.correct_answer)? },
            QuestionType::FillInBlank => QuestionKind::FillInBlank { correct_text: answer_text(self.correct_answer)? },
        };

        let explanation = self.explanation.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
        Ok(Question { prompt, kind, explanation })
    }
}

/// An index, an index string like `"2"`, or the text of one option.
fn resolve_index(answer: &CorrectAnswer, options: &[String]) -> Result<usize, String> {
    let index = match answer {
        CorrectAnswer::Index(i) => usize::try_from(*i).ok(),
        CorrectAnswer::Text(text) => {
            let text = text.trim();
            text.parse::<usize>().ok().filter(|i| *i < options.len()).or_else(|| {
                options
                    .iter()
                    .position(|option| option.trim().eq_ignore_ascii_case(text))
            })
        }
    };

    index
        .filter(|i| *i < options.len())
        .ok_or_else(|| format!("correct answer {:?} is not a valid option index", answer))
}

fn answer_text(answer: CorrectAnswer) -> Result<String, String> {
    let text = match answer {
        CorrectAnswer::Index(i) => i.to_string(),
        CorrectAnswer::Text(text) => text.trim().to_string(),
    };
    if text.is_empty() {
        return Err("correct answer is empty".to_string());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(correct: CorrectAnswer) -> QuestionPayload {
        QuestionPayload {
            question: "Which is largest?".to_string(),
            question_type: None,
            options: Some(vec!["Moon".into(), "Earth".into(), "Sun".into(), "Mars".into()]),
            correct_answer: correct,
            explanation: Some("  ".to_string()),
        }
    }

    #[test]
    fn index_forms_all_resolve() {
        for answer in [CorrectAnswer::Index(2), CorrectAnswer::Text("2".into()), CorrectAnswer::Text(" sun ".into())] {
            let q = mc(answer).into_question(QuestionMix::MultipleChoice).unwrap();
            assert_eq!(q.kind, QuestionKind::MultipleChoice {
                options: vec!["Moon".into(), "Earth".into(), "Sun".into(), "Mars".into()],
                correct_index: 2,
            });
            assert_eq!(q.explanation, None);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(mc(CorrectAnswer::Index(4)).into_question(QuestionMix::Mixed).is_err());
        assert!(mc(CorrectAnswer::Index(-1)).into_question(QuestionMix::Mixed).is_err());
        assert!(mc(CorrectAnswer::Text("Pluto".into())).into_question(QuestionMix::Mixed).is_err());
    }

    #[test]
    fn wrong_option_count_is_rejected() {
        let mut q = mc(CorrectAnswer::Index(0));
        q.options = Some(vec!["a".into(), "b".into(), "c".into()]);
        let err = q.into_question(QuestionMix::MultipleChoice).unwrap_err();
        assert!(err.contains("expected 4 options"));
    }

    #[test]
    fn type_is_inferred_without_tag() {
        let blank = QuestionPayload {
            question: "Water boils at ___ degrees Celsius.".to_string(),
            question_type: None,
            options: None,
            correct_answer: CorrectAnswer::Index(100),
            explanation: None,
        };
        let q = blank.into_question(QuestionMix::Mixed).unwrap();
        assert_eq!(q.kind, QuestionKind::FillInBlank { correct_text: "100".to_string() });
    }

    #[test]
    fn text_question_rejected_in_multiple_choice_mode() {
        let short = QuestionPayload {
            question: "Capital of France?".to_string(),
            question_type: Some(QuestionType::ShortAnswer),
            options: None,
            correct_answer: CorrectAnswer::Text("Paris".into()),
            explanation: None,
        };
        assert!(short.into_question(QuestionMix::MultipleChoice).is_err());
    }

    #[test]
    fn conversion_error_names_the_question() {
        let mut bad = mc(CorrectAnswer::Index(0));
        bad.options = None;
        bad.question_type = Some(QuestionType::MultipleChoice);
        let payload = QuizPayload { questions: vec![mc(CorrectAnswer::Index(1)), bad] };
        let err = payload.into_questions(QuestionMix::MultipleChoice).unwrap_err();
        assert!(err.starts_with("question 2:"), "{err}");
    }
}
