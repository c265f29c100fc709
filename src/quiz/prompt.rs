use super::model::{Difficulty, QuestionMix, QuizRequest, OPTION_COUNT};
use super::payload::{QuizPayload, BLANK_MARKER};
use crate::core::add_schema_guidance;

fn difficulty_guidance(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Questions should suit a beginner and test well-known basic facts.",
        Difficulty::Medium => "Questions should suit someone with general familiarity and require some specific knowledge.",
        Difficulty::Hard => "Questions should challenge an expert and test detailed or lesser-known facts.",
    }
}

fn mix_guidance(mix: QuestionMix) -> String {
    match mix {
        QuestionMix::MultipleChoice => format!(
            "Every question must be multiple choice (\"type\": \"multiple_choice\") with exactly {} options. \
             \"correctAnswer\" is the zero-based index of the correct option.",
            OPTION_COUNT
        ),
        QuestionMix::Mixed => format!(
            "Use a mix of question types:\n\
             - about half multiple choice (\"type\": \"multiple_choice\") with exactly {} options, \
             where \"correctAnswer\" is the zero-based index of the correct option as a string, e.g. \"2\";\n\
             - short answer (\"type\": \"short_answer\"), where \"correctAnswer\" is a single word or short phrase;\n\
             - fill in the blank (\"type\": \"fill_in_blank\"), where the question contains {} for the gap \
             and \"correctAnswer\" is the exact missing word or phrase.\n\
             Omit \"options\" for short answer and fill in the blank questions. \
             Text answers are checked by exact match ignoring case, so keep them unambiguous.",
            OPTION_COUNT, BLANK_MARKER
        ),
    }
}

/// The instruction text for one quiz, without the schema.
pub fn build_prompt(request: &QuizRequest) -> String {
    format!(
        "Create a {difficulty} quiz about \"{topic}\" with exactly {count} questions.\n\
         {level}\n\
         {mix}\n\
         Give each question a one-sentence \"explanation\" of the correct answer.\n\
         Questions must be factually accurate and must not repeat.",
        difficulty = request.difficulty,
        topic = request.trimmed_topic(),
        count = request.count,
        level = difficulty_guidance(request.difficulty),
        mix = mix_guidance(request.mix),
    )
}

/// The full prompt sent to the model: instructions plus the output schema.
pub fn build_schema_prompt(request: &QuizRequest) -> String {
    add_schema_guidance::<QuizPayload>(&build_prompt(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_request_fields() {
        let request = QuizRequest::new("  Roman Empire ", Difficulty::Medium, 3);
        let prompt = build_prompt(&request);
        assert!(prompt.contains("medium quiz about \"Roman Empire\""));
        assert!(prompt.contains("exactly 3 questions"));
        assert!(prompt.contains("exactly 4 options"));
        assert!(!prompt.contains("fill_in_blank"));
    }

    #[test]
    fn mixed_prompt_describes_all_types() {
        let request = QuizRequest::new("Chemistry", Difficulty::Hard, 6).with_mix(QuestionMix::Mixed);
        let prompt = build_prompt(&request);
        for needle in ["multiple_choice", "short_answer", "fill_in_blank", BLANK_MARKER] {
            assert!(prompt.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn schema_prompt_carries_payload_fields() {
        let prompt = build_schema_prompt(&QuizRequest::new("Rust", Difficulty::Easy, 2));
        assert!(prompt.contains("## Response Format"));
        assert!(prompt.contains("\"correctAnswer\""));
        assert!(prompt.contains("\"questions\""));
    }
}
