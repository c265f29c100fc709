use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::mock::{MockClient, MockHandle};
use crate::config::KeyFromEnv;
use crate::core::LowLevelClient;
use crate::error::AIError;

/// Canned quiz served by the offline `mock` client.
const DEMO_QUIZ: &str = r#"{
  "questions": [
    {
      "question": "Which planet is known as the Red Planet?",
      "type": "multiple_choice",
      "options": ["Venus", "Mars", "Jupiter", "Mercury"],
      "correctAnswer": 1,
      "explanation": "Iron oxide on its surface gives Mars its reddish colour."
    },
    {
      "question": "The chemical symbol for gold is ___.",
      "type": "fill_in_blank",
      "correctAnswer": "Au",
      "explanation": "From the Latin word aurum."
    },
    {
      "question": "What gas do plants absorb from the air for photosynthesis?",
      "type": "short_answer",
      "correctAnswer": "Carbon dioxide",
      "explanation": "Plants take in CO2 and release oxygen."
    }
  ]
}"#;

/// Which provider backs a `FlexibleClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    #[cfg(feature = "anthropic")]
    Claude,
    #[cfg(feature = "deepseek")]
    DeepSeek,
    #[cfg(feature = "gemini")]
    Gemini,
    Mock,
}

impl ClientType {
    /// Providers in auto-detection order.
    const DETECTION_ORDER: &'static [ClientType] = &[
        #[cfg(feature = "gemini")]
        Self::Gemini,
        #[cfg(feature = "anthropic")]
        Self::Claude,
        #[cfg(feature = "deepseek")]
        Self::DeepSeek,
    ];

    /// The usable API key for this provider, with the same rules the client
    /// applies when it is built. The mock needs none.
    pub fn find_key(self) -> Option<String> {
        match self {
            #[cfg(feature = "anthropic")]
            Self::Claude => super::ClaudeClient::find_key(),
            #[cfg(feature = "deepseek")]
            Self::DeepSeek => super::DeepSeekClient::find_key(),
            #[cfg(feature = "gemini")]
            Self::Gemini => super::GeminiClient::find_key(),
            Self::Mock => None,
        }
    }

    /// First provider in detection order for which `has_key` holds, else the mock.
    fn detect(has_key: impl Fn(ClientType) -> bool) -> Self {
        Self::DETECTION_ORDER
            .iter()
            .copied()
            .find(|client_type| has_key(*client_type))
            .unwrap_or(Self::Mock)
    }
}

impl Default for ClientType {
    /// Pick the first provider whose API key is usable, else the mock.
    fn default() -> Self {
        Self::detect(|client_type| client_type.find_key().is_some())
    }
}

impl FromStr for ClientType {
    type Err = String;

    /// Case insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            #[cfg(feature = "anthropic")]
            "claude" => Ok(Self::Claude),
            #[cfg(feature = "deepseek")]
            "deepseek" => Ok(Self::DeepSeek),
            #[cfg(feature = "gemini")]
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: claude, deepseek, gemini, mock", s)),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "anthropic")]
            ClientType::Claude => write!(f, "Claude"),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            #[cfg(feature = "gemini")]
            ClientType::Gemini => write!(f, "Gemini"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Client chosen at runtime. Cloning shares the underlying provider.
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<dyn LowLevelClient>,
    client_type: ClientType,
}

impl FlexibleClient {
    pub fn new(client: Box<dyn LowLevelClient>, client_type: ClientType) -> Self {
        Self { inner: Arc::from(client), client_type }
    }

    /// Build the provider for `client_type`, reading its key from the
    /// environment. `Mock` serves a canned demo quiz.
    pub fn from_type(client_type: ClientType, timeout: Duration) -> Result<Self, AIError> {
        info!(client = %client_type, "Creating flexible client");
        let client: Box<dyn LowLevelClient> = match client_type {
            #[cfg(feature = "anthropic")]
            ClientType::Claude => {
                use super::claude::{ClaudeClient, ClaudeConfig, ClaudeModel};
                let api_key = ClaudeClient::find_key_with_user().map_err(AIError::Claude)?;
                let config = ClaudeConfig::anthropic(api_key, ClaudeModel::default()).with_timeout(timeout);
                Box::new(ClaudeClient::new(config))
            }
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => {
                use super::deepseek::{DeepSeekClient, DeepSeekConfig};
                let api_key = DeepSeekClient::find_key_with_user().map_err(AIError::DeepSeek)?;
                Box::new(DeepSeekClient::new(DeepSeekConfig { api_key, timeout, ..DeepSeekConfig::default() }))
            }
            #[cfg(feature = "gemini")]
            ClientType::Gemini => {
                use super::gemini::{GeminiClient, GeminiConfig};
                let api_key = GeminiClient::find_key_with_user().map_err(AIError::Gemini)?;
                Box::new(GeminiClient::new(GeminiConfig { api_key, timeout, ..GeminiConfig::default() }))
            }
            ClientType::Mock => {
                let (mock, handle) = MockClient::new();
                handle.set_fallback(DEMO_QUIZ);
                Box::new(mock)
            }
        };
        Ok(Self::new(client, client_type))
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::new();
        (Self::new(Box::new(mock_client), ClientType::Mock), handle)
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_type_parsing() {
        assert_eq!("MOCK".parse::<ClientType>(), Ok(ClientType::Mock));
        #[cfg(feature = "gemini")]
        assert_eq!("gemini".parse::<ClientType>(), Ok(ClientType::Gemini));
        #[cfg(feature = "anthropic")]
        assert_eq!("Claude".parse::<ClientType>(), Ok(ClientType::Claude));
        assert!("gpt".parse::<ClientType>().is_err());
    }

    #[test]
    fn detection_skips_providers_without_a_usable_key() {
        assert_eq!(ClientType::detect(|_| false), ClientType::Mock);
        #[cfg(all(feature = "gemini", feature = "anthropic"))]
        {
            assert_eq!(ClientType::detect(|t| t == ClientType::Claude), ClientType::Claude);
            assert_eq!(ClientType::detect(|_| true), ClientType::Gemini);
        }
    }

    #[test]
    fn mock_needs_no_key() {
        assert_eq!(ClientType::Mock.find_key(), None);
    }

    #[tokio::test]
    async fn mock_type_serves_demo_quiz() {
        let client = FlexibleClient::from_type(ClientType::Mock, Duration::from_secs(1)).unwrap();
        let first = client.ask_raw("anything".to_string()).await.unwrap();
        let second = client.ask_raw("again".to_string()).await.unwrap();
        assert!(first.contains("Red Planet"));
        assert_eq!(first, second);
    }
}
