//! Chat completion client used to run the security review.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion client error.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM error: {0}")]
    Other(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("completion returned no content")]
    EmptyResponse,
}

/// Message for a chat completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text completion capability. Callers bound the call with their own deadline.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a single user prompt.
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        self.complete_with_messages(&[Message::user(prompt)]).await
    }

    /// Complete with conversation messages; returns the first choice's text.
    async fn complete_with_messages(&self, messages: &[Message]) -> Result<String, LLMError>;
}

/// OpenAI-compatible chat completion client.
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiCompletionClient {
    pub const DEFAULT_API_URL: &'static str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &'static str = "gpt-4";

    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Create from environment variables. `LLM_API_KEY` wins over `OPENAI_API_KEY`;
    /// returns `None` when neither is set.
    pub fn from_env() -> Option<Self> {
        let api_url =
            std::env::var("LLM_API_URL").unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Some(Self::new(api_url, api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete_with_messages(&self, messages: &[Message]) -> Result<String, LLMError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LLMError::Api(format!("status: {}, body: {}", status, body)));
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LLMError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LLMError::EmptyResponse)
    }
}
