//! Record types written during and after an episode.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-move record
// ---------------------------------------------------------------------------

/// One row of the move log: everything observable about a single move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub run_id: String,
    pub episode_id: String,
    pub episode_index: usize,
    pub model_name: String,
    /// Zero-based index of this move within the episode.
    pub move_idx: usize,
    pub command: String,
    pub observation: String,
    /// Score as interpreted from this move's response.
    pub score: Option<i64>,
    /// Move counter as interpreted from this move's response.
    pub moves: Option<u32>,
    pub inventory: Option<Vec<String>>,
    pub done: bool,
    pub seed: Option<String>,
    /// When the episode started.
    pub started_at: DateTime<Utc>,
    /// When this record was produced.
    pub timestamp: DateTime<Utc>,
    pub tokens_prompt: Option<u32>,
    pub tokens_completion: Option<u32>,
    /// The command came from the fallback policy, not the generator.
    pub fallback_used: bool,
}

// ---------------------------------------------------------------------------
// Episode summary
// ---------------------------------------------------------------------------

/// Final summary of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub model_name: String,
    /// Unique identifier (UUID v4).
    pub episode_id: String,
    pub episode_index: usize,
    pub final_score: Option<i64>,
    /// Total moves as tracked by the game state.
    pub moves: u32,
    /// `true` when the game signalled completion, `false` on the move cap.
    pub ended_naturally: bool,
    /// Where the move records were written.
    pub log_path: PathBuf,
}

impl EpisodeResult {
    /// Short label for how the episode ended.
    pub fn end_state(&self) -> &'static str {
        if self.ended_naturally {
            "natural"
        } else {
            "max_moves"
        }
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// How a single episode of a run finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Completed(EpisodeResult),
    Aborted { episode_index: usize, reason: String },
}

/// Everything a run produced, in episode order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub episodes: Vec<EpisodeOutcome>,
    /// Set when a failure stopped the run before all episodes were attempted.
    pub run_aborted: Option<String>,
}

impl RunSummary {
    pub fn completed(&self) -> impl Iterator<Item = &EpisodeResult> {
        self.episodes.iter().filter_map(|outcome| match outcome {
            EpisodeOutcome::Completed(result) => Some(result),
            EpisodeOutcome::Aborted { .. } => None,
        })
    }

    pub fn aborted_count(&self) -> usize {
        self.episodes
            .iter()
            .filter(|outcome| matches!(outcome, EpisodeOutcome::Aborted { .. }))
            .count()
    }
}
