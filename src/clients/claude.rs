use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::http::{http_client, send_json};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::AIError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClaudeModel {
    #[default]
    Haiku35,
    Sonnet4,
    Override(String),
}

impl ClaudeModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Haiku35 => "claude-3-5-haiku-20241022",
            Self::Sonnet4 => "claude-sonnet-4-20250514",
            Self::Override(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: ClaudeModel,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: ClaudeModel::default(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClaudeConfig {
    #[must_use]
    pub fn anthropic(api_key: String, model: ClaudeModel) -> Self {
        Self { api_key, model, ..Default::default() }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ClaudeMessage; 1],
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

impl ClaudeResponse {
    /// Text blocks joined in order. Non-text blocks are skipped.
    fn into_text(self) -> String {
        self.content.into_iter().filter_map(|block| block.text).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model.id(), "Creating new Claude client");
        let client = http_client(config.timeout);
        Self { config, client }
    }

    /// Build from `ANTHROPIC_API_KEY` with the default model.
    pub fn from_env() -> Result<Self, AIError> {
        let api_key = Self::require_key().map_err(AIError::Claude)?;
        Ok(Self::new(ClaudeConfig::anthropic(api_key, ClaudeModel::default())))
    }
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        let request = ClaudeRequest {
            model: self.config.model.id(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: [ClaudeMessage { role: "user", content: prompt }],
        };

        debug!("Sending request to Claude API");
        let builder = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request);
        let response: ClaudeResponse = send_json(builder, "claude", AIError::Claude).await?;

        debug!(content_count = response.content.len(), "Parsed Claude response");
        let text = response.into_text();
        if text.is_empty() {
            warn!("Claude response carried no text");
            return Ok(text);
        }

        info!(response_len = text.len(), "Successfully received Claude response");
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
    fn joins_text_blocks() {
        let response: ClaudeResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"questions\":"},{"type":"tool_use"},{"type":"text","text":"[]}"}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text(), r#"{"questions":[]}"#);
    }

    #[test]
    fn missing_content_is_empty_text() {
        let response: ClaudeResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(response.into_text(), "");
        let response: ClaudeResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.into_text(), "");
    }
}
