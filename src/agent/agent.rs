//! Action generation: turn a prompt into the next game command.
//!
//! Generators never hide failures behind a normal-looking action. They return
//! [`Generation::Failed`] and leave retry, substitution, or abort to the
//! caller's [`GenerationPolicy`](super::policy::GenerationPolicy).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerationFailure;
use crate::model::api::{ChatMessage, LlmClient};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A cleaned command together with optional token accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGeneration {
    /// A single non-empty command.
    pub action: String,
    pub tokens_prompt: Option<u32>,
    pub tokens_completion: Option<u32>,
}

impl ActionGeneration {
    /// An action with no token accounting.
    pub fn untracked(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            tokens_prompt: None,
            tokens_completion: None,
        }
    }
}

/// Outcome of one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Generated(ActionGeneration),
    Failed(GenerationFailure),
}

// ---------------------------------------------------------------------------
// Generator trait
// ---------------------------------------------------------------------------

/// Produces the next command for a prompt.
#[allow(async_fn_in_trait)]
pub trait ActionGenerator: Send + Sync {
    async fn generate(&mut self, model_name: &str, prompt: &str) -> Generation;
}

// ---------------------------------------------------------------------------
// LLM-backed generator
// ---------------------------------------------------------------------------

/// Generator that asks an OpenAI-compatible chat model for the next command.
#[derive(Debug, Clone)]
pub struct LlmActionGenerator {
    client: LlmClient,
    temperature: f64,
    max_tokens: u32,
}

impl LlmActionGenerator {
    pub fn new(client: LlmClient, temperature: f64, max_tokens: u32) -> Self {
        Self {
            client,
            temperature,
            max_tokens,
        }
    }
}

impl ActionGenerator for LlmActionGenerator {
    async fn generate(&mut self, model_name: &str, prompt: &str) -> Generation {
        if !self.client.has_credential() {
            return Generation::Failed(GenerationFailure::MissingCredential);
        }

        let messages = [ChatMessage::user(prompt)];
        let response = match self
            .client
            .chat_completion(model_name, &messages, self.temperature, self.max_tokens)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(model = model_name, error = %format!("{e:#}"), "chat completion failed");
                return Generation::Failed(GenerationFailure::Provider(format!("{e:#}")));
            }
        };

        let Some(action) = clean_action(response.first_content()) else {
            return Generation::Failed(GenerationFailure::EmptyCompletion);
        };
        debug!(model = model_name, action = %action, "model produced action");

        Generation::Generated(ActionGeneration {
            action,
            tokens_prompt: response.usage.as_ref().map(|u| u.prompt_tokens),
            tokens_completion: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Extract a single command from raw model output.
///
/// Takes the first line that is non-empty after trimming whitespace, backticks
/// and quotes. Returns `None` if no such line exists.
pub fn clean_action(text: &str) -> Option<String> {
    text.lines()
        .map(|line| line.trim().trim_matches(|c: char| c == '`' || c == '"').trim())
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
}
