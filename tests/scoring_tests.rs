use quiz_forge::quiz::{review_quiz, score, Answer, Difficulty, OptionMark, Question, Quiz, QuizRequest};

fn science_quiz() -> Quiz {
    Quiz::new(
        QuizRequest::new("Science", Difficulty::Easy, 3),
        vec![
            Question::multiple_choice(
                "Which planet is known as the Red Planet?",
                ["Venus", "Mars", "Jupiter", "Saturn"],
                1,
            )
            .with_explanation("Iron oxide on its surface gives Mars its colour."),
            Question::short_answer("What gas do plants absorb from the air?", "Carbon dioxide"),
            Question::fill_in_blank("Water boils at ___ degrees Celsius at sea level.", "100"),
        ],
    )
    .unwrap()
}

#[test]
fn all_correct_ignores_case_and_outer_whitespace() {
    let quiz = science_quiz();
    let answers = [
        Answer::Choice(1),
        Answer::Text("  CARBON dioxide\n".to_string()),
        Answer::Text("100 ".to_string()),
    ];

    let result = score(&quiz, &answers);

    assert_eq!((result.correct, result.total), (3, 3));
    assert!(result.is_perfect());
    assert_eq!(result.percentage(), 100);
}

#[test]
fn all_unanswered_scores_zero() {
    let quiz = science_quiz();
    let answers = Answer::blank_sheet(quiz.len());

    let result = score(&quiz, &answers);

    assert_eq!(result.correct, 0);
    assert_eq!(result.total, 3);
    assert_eq!(result.percentage(), 0);
}

#[test]
fn short_answers_need_exact_text() {
    let quiz = science_quiz();
    let answers = [Answer::Choice(1), Answer::Text("CO2".to_string()), Answer::Text("one hundred".to_string())];

    assert_eq!(score(&quiz, &answers).correct, 1);
}

#[test]
fn missing_trailing_answers_count_as_unanswered() {
    let quiz = science_quiz();
    let result = score(&quiz, &[Answer::Choice(1)]);
    assert_eq!((result.correct, result.total), (1, 3));
    assert_eq!(result.percentage(), 33);
}

#[test]
fn review_marks_correct_and_wrong_choice() {
    let quiz = science_quiz();
    let answers = [Answer::Choice(2), Answer::Unanswered, Answer::Text("100".to_string())];

    let items = review_quiz(&quiz, &answers);

    let first = &items[0];
    assert_eq!(first.number, 1);
    assert!(!first.is_correct);
    assert_eq!(first.given_display.as_deref(), Some("Jupiter"));
    assert_eq!(first.correct_display, "Mars");
    let marks: Vec<_> = first.options.iter().map(|o| o.mark).collect();
    assert_eq!(
        marks,
        [OptionMark::Neutral, OptionMark::Correct, OptionMark::SelectedWrong, OptionMark::Neutral]
    );
    assert!(first.options[2].selected);
    assert!(first.question.explanation.is_some());
}

#[test]
fn review_of_unanswered_and_text_questions() {
    let quiz = science_quiz();
    let answers = [Answer::Choice(1), Answer::Unanswered, Answer::Text(" 100 ".to_string())];

    let items = review_quiz(&quiz, &answers);

    assert!(items[0].is_correct);
    assert!(items[0].options.iter().all(|o| o.mark != OptionMark::SelectedWrong));

    assert!(!items[1].is_correct);
    assert_eq!(items[1].given_display, None);
    assert_eq!(items[1].correct_display, "Carbon dioxide");
    assert!(items[1].options.is_empty());

    assert!(items[2].is_correct);
    assert_eq!(items[2].given_display.as_deref(), Some("100"));
}

#[test]
fn review_agrees_with_score() {
    let quiz = science_quiz();
    let answers = [Answer::Choice(0), Answer::Text("carbon dioxide".to_string()), Answer::Unanswered];

    let items = review_quiz(&quiz, &answers);
    let correct = items.iter().filter(|item| item.is_correct).count();

    assert_eq!(correct, score(&quiz, &answers).correct);
    assert_eq!(items.len(), quiz.len());
}
