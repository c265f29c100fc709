use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::model::{Quiz, QuizRequest};
use super::payload::{QuestionPayload, QuizPayload};
use super::prompt::build_schema_prompt;
use crate::config::QuizSettings;
use crate::core::LowLevelClient;
use crate::error::QuizError;
use crate::interceptors::{Exchange, Interceptor};
use crate::json_utils::extract_first;

/// Turns a `QuizRequest` into a `Quiz` through a model client.
///
/// One request, one call: a malformed or empty reply is reported, never
/// retried or repaired.
#[derive(Clone, Debug)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    settings: QuizSettings,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C, settings: QuizSettings) -> Self {
        info!(
            min_questions = settings.min_questions,
            max_questions = settings.max_questions,
            "Creating new QuizGenerator"
        );
        Self { client, settings, interceptor: None }
    }

    /// Record every prompt and raw reply.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn validate(&self, request: &QuizRequest) -> Result<(), QuizError> {
        request.validate(&self.settings)
    }

    #[instrument(
        target = "quiz_forge::generator",
        skip(self, request),
        fields(topic = %request.trimmed_topic(), difficulty = %request.difficulty, count = request.count)
    )]
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        self.validate(request)?;

        let prompt = build_schema_prompt(request);
        debug!(prompt_len = prompt.len(), "Requesting quiz");
        let raw = self.client.ask_raw(prompt.clone()).await?;
        self.intercept(request, &prompt, &raw).await;

        if raw.trim().is_empty() {
            warn!("Service returned an empty response");
            return Err(QuizError::Generation("the service returned an empty response".to_string()));
        }

        let payload = parse_payload(&raw)?;

        let questions = payload
            .into_questions(request.mix)
            .map_err(|msg| QuizError::parse(msg, &raw))?;
        if questions.len() != request.count {
            warn!(requested = request.count, returned = questions.len(), "Question count differs from request");
        }

        let quiz = Quiz::new(request.clone(), questions)?;
        info!(question_count = quiz.len(), "Quiz generated");
        Ok(quiz)
    }

    async fn intercept(&self, request: &QuizRequest, prompt: &str, raw: &str) {
        let Some(interceptor) = &self.interceptor else {
            return;
        };
        let exchange = Exchange { topic: request.trimmed_topic(), prompt, response: raw };
        if let Err(e) = interceptor.save(exchange).await {
            warn!(error = %e, "Failed to save transcript");
        }
    }
}

/// The wrapped `{"questions": [...]}` form first, then a bare question list.
///
/// A bare list is taken only as a whole: the full text or one top-level
/// array must deserialize as questions. Individual question objects are
/// never picked out of a payload that failed as a whole.
fn parse_payload(raw: &str) -> Result<QuizPayload, QuizError> {
    let err = match extract_first::<QuizPayload>(raw) {
        Ok(payload) => return Ok(payload),
        Err(e) => e,
    };

    match extract_first::<Vec<QuestionPayload>>(raw) {
        Ok(questions) if !questions.is_empty() => {
            debug!(question_count = questions.len(), "Accepted unwrapped question list");
            Ok(QuizPayload { questions })
        }
        _ => {
            warn!(error = %err, response_len = raw.len(), "Response is not a valid quiz");
            Err(QuizError::parse(err, raw))
        }
    }
}
