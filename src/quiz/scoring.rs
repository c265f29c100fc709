use serde::Serialize;

use super::model::{Answer, Question, QuestionKind, Quiz};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// Share of correct answers, rounded half up to a whole percent.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct * 200 + self.total) / (self.total * 2)) as u32
    }

    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// Case-insensitive, whitespace-trimmed equality. No fuzzy matching.
pub fn texts_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}

pub fn is_correct(question: &Question, answer: &Answer) -> bool {
    match (&question.kind, answer) {
        (_, Answer::Unanswered) => false,
        (QuestionKind::MultipleChoice { correct_index, .. }, Answer::Choice(i)) => i == correct_index,
        (QuestionKind::MultipleChoice { correct_index, .. }, Answer::Text(text)) => {
            text.trim().parse::<usize>().map_or(false, |i| i == *correct_index)
        }
        (QuestionKind::ShortAnswer { correct_text } | QuestionKind::FillInBlank { correct_text }, Answer::Text(text)) => {
            texts_match(text, correct_text)
        }
        (QuestionKind::ShortAnswer { .. } | QuestionKind::FillInBlank { .. }, Answer::Choice(_)) => false,
    }
}

/// Count of questions whose answer is correct. Missing answers count as
/// unanswered.
pub fn score(quiz: &Quiz, answers: &[Answer]) -> Score {
    let correct = quiz
        .questions()
        .iter()
        .enumerate()
        .filter(|(i, question)| answers.get(*i).map_or(false, |answer| is_correct(question, answer)))
        .count();

    Score { correct, total: quiz.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(Score { correct: 2, total: 3 }.percentage(), 67);
        assert_eq!(Score { correct: 1, total: 3 }.percentage(), 33);
        assert_eq!(Score { correct: 1, total: 8 }.percentage(), 13);
        assert_eq!(Score { correct: 0, total: 0 }.percentage(), 0);
        assert_eq!(Score { correct: 4, total: 4 }.percentage(), 100);
    }

    #[test]
    fn text_match_ignores_case_and_outer_whitespace_only() {
        assert!(texts_match("  carbon DIOXIDE ", "Carbon dioxide"));
        assert!(!texts_match("carbon  dioxide", "Carbon dioxide"));
        assert!(!texts_match("CO2", "Carbon dioxide"));
    }

    #[test]
    fn choice_never_matches_text_question() {
        let q = Question::short_answer("2 + 2?", "4");
        assert!(!is_correct(&q, &Answer::Choice(4)));
        assert!(is_correct(&q, &Answer::Text(" 4".into())));
    }

    #[test]
    fn stringified_index_matches_multiple_choice() {
        let q = Question::multiple_choice("Pick b", ["a", "b", "c", "d"], 1);
        assert!(is_correct(&q, &Answer::Text("1".into())));
        assert!(!is_correct(&q, &Answer::Text("b".into())));
    }
}
