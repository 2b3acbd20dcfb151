//! Move records and where they are written.
//!
//! This module provides:
//! - [`types::MoveRecord`] -- one row per move, the atomic unit of
//!   observability for an episode.
//! - [`types::EpisodeResult`], [`types::RunSummary`] -- per-episode and
//!   per-run summaries.
//! - [`sink::LogSink`] -- the append-only store, with a JSON Lines file
//!   implementation and an in-memory one.

pub mod sink;
pub mod types;

pub use sink::{JsonlLogSink, LogSink, MemoryLogSink, DEFAULT_LOG_DIR};
pub use types::{EpisodeOutcome, EpisodeResult, MoveRecord, RunSummary};
