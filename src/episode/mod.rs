//! Episode execution.
//!
//! - [`state::GameState`] -- per-episode accumulator.
//! - [`engine::EpisodeEngine`] -- the turn loop for a single episode.
//! - [`runner::run_experiment`] -- sequential episodes under one run id.

pub mod engine;
pub mod runner;
pub mod state;

pub use engine::{EpisodeEngine, EpisodeRequest};
pub use runner::{run_experiment, RunRequest};
pub use state::{GameState, HistoryEntry};
