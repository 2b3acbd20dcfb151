//! Deterministic offline stand-in for the ZorkAPI service.
//!
//! [`MockZorkEnv`] keeps an explicit session store keyed by session id. Each
//! step renders a canned room description followed by the same status
//! sentence the real game prints for `score`, so responses go through the
//! regular text interpreter.

use std::collections::HashMap;

use serde_json::json;
use uuid::Uuid;

use super::interpret::interpret;
use super::traits::{EnvironmentAdapter, StepResult};
use crate::error::EnvError;

/// Number of moves after which a mock game ends.
pub const MOCK_MOVE_LIMIT: u32 = 8;

/// Points awarded for a "productive" command.
const REWARD_POINTS: i64 = 5;

const REWARD_KEYWORDS: &[&str] = &["take", "open", "light", "inventory"];

const ROOM_TEMPLATES: &[&str] = &[
    "You are standing in a mock forest. Paths lead in all directions.",
    "A small mailbox is here. It seems slightly ajar.",
    "There is a grating in the ground, locked tight.",
    "You are inside a mock house with a dusty table.",
];

/// Per-session state of the mock game.
#[derive(Debug, Clone)]
struct MockSession {
    game_title: String,
    moves: u32,
    score: i64,
    inventory: Vec<String>,
    done: bool,
}

impl MockSession {
    fn new(game_title: &str) -> Self {
        Self {
            game_title: game_title.to_string(),
            moves: 0,
            score: 0,
            inventory: vec!["brass lantern".to_string()],
            done: false,
        }
    }
}

/// Offline game backend with an adapter-owned session store.
#[derive(Debug, Default)]
pub struct MockZorkEnv {
    sessions: HashMap<String, MockSession>,
}

impl MockZorkEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently open.
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn render_observation(command: &str, session: &MockSession) -> String {
        let room = ROOM_TEMPLATES[session.moves as usize % ROOM_TEMPLATES.len()];
        format!(
            "Command '{command}' processed. {room} (mock turn {turn}).\n\
             Your score is {score} (total of 350 points), in {turn} moves.",
            turn = session.moves,
            score = session.score,
        )
    }
}

impl EnvironmentAdapter for MockZorkEnv {
    async fn new_game(&mut self, identity: &str, game_title: &str) -> Result<String, EnvError> {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), MockSession::new(game_title));
        tracing::debug!(session = %session_id, identity, game = game_title, "mock session created");
        Ok(session_id)
    }

    async fn step(
        &mut self,
        identity: &str,
        _game_title: &str,
        command: &str,
    ) -> Result<StepResult, EnvError> {
        let session = self
            .sessions
            .get_mut(identity)
            .ok_or_else(|| EnvError::UnknownSession(identity.to_string()))?;

        session.moves += 1;

        let lowered = command.to_lowercase();
        if REWARD_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            session.score += REWARD_POINTS;
        }

        let observation = Self::render_observation(command, session);

        let normalized = lowered.trim();
        if session.moves >= MOCK_MOVE_LIMIT || normalized == "quit" || normalized == "exit" {
            session.done = true;
        }

        let payload = json!({
            "cmdOutput": observation,
            "title": session.game_title,
            "inventory": session.inventory,
            "gameOver": session.done,
        });
        Ok(interpret(&payload))
    }

    async fn close(&mut self, session_id: &str) -> Result<(), EnvError> {
        self.sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| EnvError::UnknownSession(session_id.to_string()))
    }
}
