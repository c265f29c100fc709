use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::http::{http_client, send_json};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::AIError;

const CHAT_URL: &str = "https://api.deepseek.com/v1/chat/completions";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeepSeekModel {
    #[default]
    Chat,
    Reasoner,
    Override(String),
}

impl DeepSeekModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Chat => "deepseek-chat",
            Self::Reasoner => "deepseek-reasoner",
            Self::Override(s) => s.as_str(),
        }
    }
}

/// Configuration for DeepSeek client
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: DeepSeekModel,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DeepSeekModel::default(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeepSeekRequest<'a> {
    model: &'a str,
    messages: [DeepSeekMessage; 1],
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct DeepSeekMessage {
    role: &'static str,
    content: String,
}

// json_object mode makes the API refuse non-JSON completions
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    #[serde(default)]
    choices: Vec<DeepSeekChoice>,
}

impl DeepSeekResponse {
    /// Content of the first choice, empty when there is none.
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekResponseMessage,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    /// Create a new DeepSeek client with full configuration
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model.id(), "Creating new DeepSeek client");
        let client = http_client(config.timeout);
        Self { config, client }
    }

    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::require_key().map_err(AIError::DeepSeek)?;
        Ok(Self::new(DeepSeekConfig { api_key, ..DeepSeekConfig::default() }))
    }
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = DeepSeekRequest {
            model: self.config.model.id(),
            messages: [DeepSeekMessage { role: "user", content: prompt }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!("Sending request to DeepSeek API");
        let builder = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&request);
        let response: DeepSeekResponse = send_json(builder, "deepseek", AIError::DeepSeek).await?;

        debug!(choices_count = response.choices.len(), "Parsed DeepSeek response");
        let text = response.into_text();
        if text.is_empty() {
            warn!("DeepSeek response carried no content");
            return Ok(text);
        }

        info!(response_len = text.len(), "Successfully received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_content() {
        let response: DeepSeekResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"questions\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text(), r#"{"questions":[]}"#);
    }

    #[test]
    fn no_choices_is_empty_text() {
        let response: DeepSeekResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response.into_text(), "");
    }
}
