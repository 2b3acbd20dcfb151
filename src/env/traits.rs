//! Core environment trait and shared types.
//!
//! Every game backend (the remote ZorkAPI service, the offline mock) implements
//! the [`EnvironmentAdapter`] trait so that the episode engine can drive it
//! uniformly.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;

/// Structured outcome of one command sent to the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Narrative text shown to the player.
    pub observation: String,
    /// Parsed score, `None` when it could not be derived this turn.
    pub score: Option<i64>,
    /// Move counter as reported by the game (not the engine's turn index).
    pub moves: Option<u32>,
    /// Inventory snapshot, present only when the payload exposes one.
    pub inventory: Option<Vec<String>>,
    /// Whether the game reached a terminal state (death, win, score cap).
    pub done: bool,
    /// The full original payload, kept for replay and debugging.
    pub raw_response: serde_json::Value,
}

/// A game session backend.
///
/// `new_game` returns an opaque handle; the engine passes that handle back as
/// the `identity` of every subsequent `step` and of `close`.
#[allow(async_fn_in_trait)]
pub trait EnvironmentAdapter: Send + Sync {
    /// Start a new session for `identity` playing `game_title`.
    async fn new_game(&mut self, identity: &str, game_title: &str) -> Result<String, EnvError>;

    /// Submit one command and interpret the response.
    async fn step(
        &mut self,
        identity: &str,
        game_title: &str,
        command: &str,
    ) -> Result<StepResult, EnvError>;

    /// Release any state held for the session. Default: nothing to release.
    async fn close(&mut self, _session_id: &str) -> Result<(), EnvError> {
        Ok(())
    }
}
