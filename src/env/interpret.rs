//! Interpretation of free-text game payloads into [`StepResult`]s.
//!
//! The game reports score, move count, and termination mostly through prose
//! ("Your score is 57 (total of 350 points), in 12 moves."). Interpretation is
//! advisory: text that does not match a known phrasing leaves the field absent
//! and never fails the step.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::traits::StepResult;

/// Maximum attainable score in Zork I; reaching it ends the game.
pub const SCORE_CAP: i64 = 350;

/// Narrative phrases that mark a finished game. Matched case-sensitively.
pub const TERMINAL_PHRASES: &[&str] = &[
    "****  You have died  ****",
    "game over",
    "you have won",
    "the end",
    "would you like to restart",
];

/// Payload keys that may carry the observation text, in lookup order.
const OBSERVATION_KEYS: &[&str] = &["cmdOutput", "observation", "text"];

/// Payload keys that may carry an explicit terminal flag.
const DONE_FLAG_KEYS: &[&str] = &["gameOver", "done"];

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bscore\s+(?:is|would\s+be|was)\s+(?P<score>-?\d+)")
        .expect("score regex is valid")
});

/// Move counter inside the status sentence: `(total of 350 points), in N moves`.
static STATUS_MOVES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\)\s*,\s*in\s+(?P<moves>\d+)\s+moves?\b")
        .expect("status moves regex is valid")
});

/// Looser fallback for phrasings without the score parenthesis.
static MOVES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bin\s+(?P<moves>\d+)\s+(?:moves?|turns?)\b").expect("moves regex is valid")
});

/// Convert a raw game payload into a [`StepResult`].
///
/// Rules:
/// - If the observation never mentions "score", score and moves are both
///   reported as `Some(0)` for this turn.
/// - Otherwise each counter is parsed from its phrase; an unmatched or
///   unparseable phrase yields `None`.
/// - `inventory` is taken verbatim from an `inventory` array of strings; an
///   array holding any non-string item is ignored.
/// - `done` is the logical OR of an explicit flag, a terminal phrase, and the
///   score cap.
pub fn interpret(payload: &Value) -> StepResult {
    let observation = observation_text(payload);

    let (score, moves) = if observation.to_lowercase().contains("score") {
        (parse_score(&observation), parse_moves(&observation))
    } else {
        (Some(0), Some(0))
    };

    let inventory = payload
        .get("inventory")
        .and_then(Value::as_array)
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        });

    let explicit_done = DONE_FLAG_KEYS
        .iter()
        .any(|key| payload.get(*key).and_then(Value::as_bool) == Some(true));
    let inferred_done = TERMINAL_PHRASES
        .iter()
        .any(|phrase| observation.contains(phrase));
    let score_capped = score.is_some_and(|s| s >= SCORE_CAP);

    if score_capped && inferred_done {
        // Both signals agree on "done"; which one the game meant is unknown.
        tracing::debug!(?score, "score cap reached alongside a terminal phrase");
    }

    StepResult {
        observation,
        score,
        moves,
        inventory,
        done: explicit_done || inferred_done || score_capped,
        raw_response: payload.clone(),
    }
}

/// Extract the score from a status sentence, if one is present.
pub fn parse_score(text: &str) -> Option<i64> {
    let caps = SCORE_RE.captures(text)?;
    match caps["score"].parse() {
        Ok(score) => Some(score),
        Err(e) => {
            tracing::debug!(text = &caps["score"], error = %e, "unparseable score");
            None
        }
    }
}

/// Extract the move counter from a status sentence, if one is present.
///
/// The `"), in N moves"` status form wins over any earlier narrative
/// mention of moves or turns.
pub fn parse_moves(text: &str) -> Option<u32> {
    let caps = STATUS_MOVES_RE
        .captures(text)
        .or_else(|| MOVES_RE.captures(text))?;
    match caps["moves"].parse() {
        Ok(moves) => Some(moves),
        Err(e) => {
            tracing::debug!(text = &caps["moves"], error = %e, "unparseable move count");
            None
        }
    }
}

fn observation_text(payload: &Value) -> String {
    OBSERVATION_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}
