//! Zork harness: drives LLM agents through text-adventure episodes.
//!
//! Each move asks an action generator for a command, submits it to a game
//! session, interprets the free-text response into a structured step result,
//! and appends a record to the move log.

pub mod agent;
pub mod config;
pub mod env;
pub mod episode;
pub mod error;
pub mod model;
pub mod trajectory;
