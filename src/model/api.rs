//! OpenAI-compatible LLM API client.
//!
//! Provides typed request/response structures and a chat completion method
//! used by the action generator.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author: `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    /// The textual content of the message.
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single completion choice returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Zero-based index of this choice within the response.
    #[serde(default)]
    pub index: usize,
    /// The generated message.
    pub message: ChatMessage,
    /// The reason the model stopped generating (e.g. `"stop"`, `"length"`).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics for a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    pub completion_tokens: u32,
}

/// A chat completion response from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: String,
    /// The list of generated choices.
    pub choices: Vec<Choice>,
    /// Token usage statistics, when the provider reports them.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text content of the first choice, or an empty string.
    pub fn first_content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for an OpenAI-compatible chat completions API.
///
/// Wraps [`reqwest::Client`] with the base URL and API key needed to call
/// `/chat/completions`.
#[derive(Debug, Clone)]
pub struct LlmClient {
    api_base: String,
    api_key: String,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client pointing at `base_url` (e.g. `"https://api.openai.com/v1"`).
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            api_base: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    /// Whether a non-empty API key is configured.
    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Send a chat completion request and return the parsed response.
    ///
    /// Calls `POST {base_url}/chat/completions`.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f64,
        max_tokens: u32,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!(model, temperature, max_tokens, "sending chat completion request");

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to send chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completion API returned {status}: {text}");
        }

        let chat_response: ChatResponse = resp
            .json()
            .await
            .context("failed to parse chat completion response")?;

        info!(
            model,
            prompt_tokens = chat_response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = chat_response.usage.as_ref().map(|u| u.completion_tokens),
            "chat completion succeeded"
        );

        Ok(chat_response)
    }
}
