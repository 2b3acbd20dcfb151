//! Prompt template for the Zork-playing agent.
//!
//! The prompt is a pure function of the [`GameState`]: the same state always
//! yields the same text.

use crate::episode::state::{GameState, HistoryEntry};

/// How many recent turns are shown to the model.
pub const HISTORY_WINDOW: usize = 5;

/// Build the single-message prompt asking for the next command.
///
/// Includes the current score, inventory, and the last [`HISTORY_WINDOW`]
/// turns. The model is told to answer with exactly one command.
pub fn build_prompt(state: &GameState, model_name: &str) -> String {
    let history_block = format_history(state.recent_history(HISTORY_WINDOW));
    let inventory_text = match &state.inventory {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => "unknown".to_string(),
    };
    let score_text = state
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "You are playing the classic text adventure game Zork I. Respond with \
         exactly one valid in-game command. Do not explain, narrate, or include \
         quotes, code fences, or role statements.\n\
         Model: {model_name}. Current score: {score_text}. Inventory: {inventory_text}.\n\
         Recent turns:\n\
         {history_block}\n\
         Output a single text-adventure command only."
    )
}

fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "(no previous turns)".to_string();
    }

    entries
        .iter()
        .map(|e| format!("Command: {}\nObservation: {}", e.command, e.observation))
        .collect::<Vec<_>>()
        .join("\n\n")
}
