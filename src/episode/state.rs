//! Per-episode state accumulated across moves.

use serde::{Deserialize, Serialize};

use crate::env::StepResult;

/// One completed move as seen by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub observation: String,
}

/// Mutable accumulator owned by a single episode.
///
/// Optional fields follow "last non-null wins": a turn that does not expose a
/// value leaves the previous one in place. `moves` tracks the game's own
/// counter when reported and otherwise counts locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Opaque handle returned by the environment on episode start.
    pub session_id: String,
    /// Append-only, one entry per completed move.
    pub history: Vec<HistoryEntry>,
    pub score: Option<i64>,
    pub moves: u32,
    pub inventory: Option<Vec<String>>,
}

impl GameState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            score: None,
            moves: 0,
            inventory: None,
        }
    }

    /// Fold one step result into the state.
    pub fn update(&mut self, result: &StepResult, command: &str) {
        self.history.push(HistoryEntry {
            command: command.to_string(),
            observation: result.observation.clone(),
        });

        if let Some(score) = result.score {
            self.score = Some(score);
        }
        self.moves = match result.moves {
            Some(moves) => moves,
            None => self.moves.saturating_add(1),
        };
        if let Some(inventory) = &result.inventory {
            self.inventory = Some(inventory.clone());
        }
    }

    /// The most recent `n` history entries, oldest first.
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(score: Option<i64>, moves: Option<u32>, inventory: Option<Vec<&str>>) -> StepResult {
        StepResult {
            observation: "You are in a maze of twisty little passages.".into(),
            score,
            moves,
            inventory: inventory.map(|items| items.into_iter().map(String::from).collect()),
            done: false,
            raw_response: serde_json::Value::Null,
        }
    }

    #[test]
    fn absent_fields_keep_prior_values() {
        let mut state = GameState::new("s-1");
        state.update(&step(Some(25), Some(10), Some(vec!["sword"])), "take sword");

        state.update(&step(None, None, None), "north");
        assert_eq!(state.score, Some(25));
        assert_eq!(state.inventory, Some(vec!["sword".to_string()]));
        assert_eq!(state.moves, 11);
        assert_eq!(state.history.len(), 2);

        state.update(&step(None, None, None), "south");
        assert_eq!(state.moves, 12);
        assert_eq!(state.score, Some(25));
        assert_eq!(state.history.len(), 3);
    }

    #[test]
    fn reported_values_overwrite() {
        let mut state = GameState::new("s-1");
        state.update(&step(Some(5), Some(3), Some(vec!["lamp"])), "light lamp");
        state.update(&step(Some(0), Some(4), Some(vec![])), "drop lamp");
        assert_eq!(state.score, Some(0));
        assert_eq!(state.moves, 4);
        assert_eq!(state.inventory, Some(Vec::new()));
    }

    #[test]
    fn history_records_command_and_observation() {
        let mut state = GameState::new("s-1");
        state.update(&step(None, None, None), "look");
        assert_eq!(
            state.history[0],
            HistoryEntry {
                command: "look".into(),
                observation: "You are in a maze of twisty little passages.".into(),
            }
        );
    }

    #[test]
    fn recent_history_is_bounded() {
        let mut state = GameState::new("s-1");
        for cmd in ["a", "b", "c", "d"] {
            state.update(&step(None, None, None), cmd);
        }
        let recent: Vec<_> = state.recent_history(2).iter().map(|h| h.command.as_str()).collect();
        assert_eq!(recent, vec!["c", "d"]);
        assert_eq!(state.recent_history(10).len(), 4);
    }
}
