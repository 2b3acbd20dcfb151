//! Model client abstractions for interacting with LLM APIs.
//!
//! This module provides:
//! - [`api::LlmClient`] -- OpenAI-compatible chat completion client.
//! - [`prompt`] -- the prompt template summarising the current game state.

pub mod api;
pub mod prompt;

pub use api::{ChatMessage, ChatResponse, Choice, LlmClient, Usage};
pub use prompt::build_prompt;
