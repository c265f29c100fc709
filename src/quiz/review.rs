use serde::Serialize;

use super::model::{Answer, Question, QuestionKind, Quiz};
use super::scoring::is_correct;

/// How one multiple-choice option is shown in review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OptionMark {
    Correct,
    SelectedWrong,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionReview<'a> {
    pub text: &'a str,
    pub mark: OptionMark,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem<'a> {
    pub number: usize,
    pub question: &'a Question,
    pub given: &'a Answer,
    /// What the user answered, as display text. `None` when unanswered.
    pub given_display: Option<String>,
    pub correct_display: &'a str,
    pub is_correct: bool,
    /// Per-option marks, only for multiple choice.
    pub options: Vec<OptionReview<'a>>,
}

fn selected_index(answer: &Answer) -> Option<usize> {
    match answer {
        Answer::Choice(i) => Some(*i),
        Answer::Text(text) => text.trim().parse().ok(),
        Answer::Unanswered => None,
    }
}

fn given_display(question: &Question, answer: &Answer) -> Option<String> {
    if !answer.is_answered() {
        return None;
    }
    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { options, .. }, _) => selected_index(answer)
            .and_then(|i| options.get(i).cloned())
            .or_else(|| match answer {
                Answer::Text(text) => Some(text.trim().to_string()),
                _ => None,
            }),
        (_, Answer::Text(text)) => Some(text.trim().to_string()),
        (_, Answer::Choice(i)) => Some(format!("option {}", i + 1)),
        (_, Answer::Unanswered) => None,
    }
}

fn option_marks<'a>(question: &'a Question, answer: &Answer) -> Vec<OptionReview<'a>> {
    let QuestionKind::MultipleChoice { options, correct_index } = &question.kind else {
        return Vec::new();
    };
    let selected = selected_index(answer);

    options
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let is_selected = selected == Some(i);
            let mark = if i == *correct_index {
                OptionMark::Correct
            } else if is_selected {
                OptionMark::SelectedWrong
            } else {
                OptionMark::Neutral
            };
            OptionReview { text, mark, selected: is_selected }
        })
        .collect()
}

/// One review entry per question, in quiz order.
pub fn review_quiz<'a>(quiz: &'a Quiz, answers: &'a [Answer]) -> Vec<ReviewItem<'a>> {
    static UNANSWERED: Answer = Answer::Unanswered;

    quiz.questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let given = answers.get(i).unwrap_or(&UNANSWERED);
            ReviewItem {
                number: i + 1,
                question,
                given,
                given_display: given_display(question, given),
                correct_display: question.kind.correct_display(),
                is_correct: is_correct(question, given),
                options: option_marks(question, given),
            }
        })
        .collect()
}
