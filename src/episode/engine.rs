//! The episode engine: one game, start to finish.
//!
//! The [`EpisodeEngine`] drives an episode by repeatedly:
//!   1. building a prompt from the accumulated [`GameState`],
//!   2. resolving the next command through the generation policy,
//!   3. pausing for the pacing interval,
//!   4. stepping the environment and folding the result into the state,
//!   5. appending a [`MoveRecord`] to the sink,
//!   6. stopping if the step reported `done`.
//!
//! Everything happens strictly in that order; move `n + 1` starts only after
//! move `n`'s record has been written. Environment failures are not retried
//! here and abort the episode.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::GameState;
use crate::agent::{ActionGenerator, GenerationPolicy};
use crate::env::EnvironmentAdapter;
use crate::error::EpisodeError;
use crate::model::prompt::build_prompt;
use crate::trajectory::{EpisodeResult, LogSink, MoveRecord};

/// Parameters of a single episode.
#[derive(Debug, Clone)]
pub struct EpisodeRequest {
    pub model_name: String,
    pub max_moves: usize,
    pub run_id: String,
    pub identity: String,
    pub game_title: String,
    pub episode_index: usize,
    pub seed: Option<String>,
}

/// Owns the collaborators of an episode: environment, generator, and sink.
pub struct EpisodeEngine<E, G, S> {
    env: E,
    generator: G,
    sink: S,
    policy: GenerationPolicy,
    /// Fixed pause between generating a command and submitting it.
    pacing: Duration,
}

impl<E, G, S> EpisodeEngine<E, G, S>
where
    E: EnvironmentAdapter,
    G: ActionGenerator,
    S: LogSink,
{
    /// Create an engine with the default generation policy and no pacing.
    pub fn new(env: E, generator: G, sink: S) -> Self {
        Self {
            env,
            generator,
            sink,
            policy: GenerationPolicy::default(),
            pacing: Duration::ZERO,
        }
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run one episode to natural termination or the move cap.
    ///
    /// Session creation failures propagate before any move is made. The
    /// session is closed afterwards whether the episode finished or aborted.
    pub async fn run_episode(
        &mut self,
        request: &EpisodeRequest,
    ) -> Result<EpisodeResult, EpisodeError> {
        let session_id = self
            .env
            .new_game(&request.identity, &request.game_title)
            .await?;

        let outcome = self.play(request, session_id.clone()).await;

        if let Err(e) = self.env.close(&session_id).await {
            warn!(session = %session_id, error = %e, "failed to close session");
        }
        outcome
    }

    async fn play(
        &mut self,
        request: &EpisodeRequest,
        session_id: String,
    ) -> Result<EpisodeResult, EpisodeError> {
        let episode_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let mut state = GameState::new(session_id);
        let mut ended_naturally = false;

        info!(
            episode = request.episode_index,
            episode_id = %episode_id,
            session = %state.session_id,
            max_moves = request.max_moves,
            "episode started"
        );

        for move_idx in 0..request.max_moves {
            let prompt = build_prompt(&state, &request.model_name);

            let resolved = self
                .policy
                .resolve(&mut self.generator, &request.model_name, &prompt)
                .await
                .map_err(EpisodeError::GenerationUnavailable)?;
            let command = resolved.generation.action.as_str();

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let step = self
                .env
                .step(&state.session_id, &request.game_title, command)
                .await?;
            state.update(&step, command);

            let record = MoveRecord {
                run_id: request.run_id.clone(),
                episode_id: episode_id.clone(),
                episode_index: request.episode_index,
                model_name: request.model_name.clone(),
                move_idx,
                command: command.to_string(),
                observation: step.observation.clone(),
                score: step.score,
                moves: step.moves,
                inventory: step.inventory.clone(),
                done: step.done,
                seed: request.seed.clone(),
                started_at,
                timestamp: Utc::now(),
                tokens_prompt: resolved.generation.tokens_prompt,
                tokens_completion: resolved.generation.tokens_completion,
                fallback_used: resolved.fallback_used,
            };
            self.sink.append(&record).map_err(EpisodeError::LogSink)?;

            debug!(
                move_idx,
                command,
                score = ?step.score,
                moves = ?step.moves,
                done = step.done,
                "move recorded"
            );

            if step.done {
                ended_naturally = true;
                break;
            }
        }

        let result = EpisodeResult {
            model_name: request.model_name.clone(),
            episode_id,
            episode_index: request.episode_index,
            final_score: state.score,
            moves: state.moves,
            ended_naturally,
            log_path: self.sink.location(),
        };

        info!(
            episode = request.episode_index,
            score = ?result.final_score,
            moves = result.moves,
            end = result.end_state(),
            "episode finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use serde_json::json;

    use crate::agent::{Generation, MockActionGenerator, OnFailure, MOCK_MODEL};
    use crate::env::mock::MockZorkEnv;
    use crate::env::{interpret, StepResult};
    use crate::error::{EnvError, GenerationFailure};
    use crate::trajectory::MemoryLogSink;

    /// Replays canned payloads; an exhausted script is a transport failure.
    #[derive(Default)]
    struct ScriptedEnv {
        payloads: VecDeque<serde_json::Value>,
        fail_new_game: bool,
        closed: Vec<String>,
    }

    impl ScriptedEnv {
        fn with_payloads(payloads: Vec<serde_json::Value>) -> Self {
            Self {
                payloads: payloads.into(),
                ..Self::default()
            }
        }
    }

    impl EnvironmentAdapter for ScriptedEnv {
        async fn new_game(&mut self, identity: &str, _game_title: &str) -> Result<String, EnvError> {
            if self.fail_new_game {
                return Err(EnvError::SessionCreation("no userProfile".into()));
            }
            Ok(identity.to_string())
        }

        async fn step(
            &mut self,
            _identity: &str,
            _game_title: &str,
            _command: &str,
        ) -> Result<StepResult, EnvError> {
            self.payloads
                .pop_front()
                .map(|p| interpret(&p))
                .ok_or_else(|| EnvError::Communication("connection reset".into()))
        }

        async fn close(&mut self, session_id: &str) -> Result<(), EnvError> {
            self.closed.push(session_id.to_string());
            Ok(())
        }
    }

    /// Counts calls and always fails.
    #[derive(Default)]
    struct FailingGenerator {
        calls: usize,
    }

    impl ActionGenerator for FailingGenerator {
        async fn generate(&mut self, _model_name: &str, _prompt: &str) -> Generation {
            self.calls += 1;
            Generation::Failed(GenerationFailure::MissingCredential)
        }
    }

    fn request(max_moves: usize) -> EpisodeRequest {
        EpisodeRequest {
            model_name: MOCK_MODEL.into(),
            max_moves,
            run_id: "run-1".into(),
            identity: "player@example.com".into(),
            game_title: "zork1".into(),
            episode_index: 0,
            seed: Some("7".into()),
        }
    }

    fn status(score: i64, moves: u32) -> serde_json::Value {
        json!({ "cmdOutput": format!("Your score is {score} (total of 350 points), in {moves} moves.") })
    }

    #[tokio::test]
    async fn mock_episode_ends_naturally_at_move_cap_of_game() {
        let mut engine =
            EpisodeEngine::new(MockZorkEnv::new(), MockActionGenerator::default(), MemoryLogSink::new());

        let result = engine.run_episode(&request(8)).await.unwrap();

        assert_eq!(result.moves, 8);
        assert!(result.ended_naturally);
        assert_eq!(engine.sink().records().len(), 8);
        assert!(engine.sink().records()[7].done);
        assert_eq!(engine.env().open_sessions(), 0);
    }

    #[tokio::test]
    async fn zero_moves_never_calls_generator() {
        let mut engine = EpisodeEngine::new(
            ScriptedEnv::default(),
            FailingGenerator::default(),
            MemoryLogSink::new(),
        )
        .with_policy(GenerationPolicy {
            on_failure: OnFailure::Abort,
            ..GenerationPolicy::default()
        });

        let result = engine.run_episode(&request(0)).await.unwrap();

        assert_eq!(result.moves, 0);
        assert!(!result.ended_naturally);
        assert_eq!(result.final_score, None);
        assert_eq!(engine.generator.calls, 0);
        assert!(engine.sink().records().is_empty());
    }

    #[tokio::test]
    async fn stops_after_third_move_reports_done() {
        let env = ScriptedEnv::with_payloads(vec![
            status(0, 1),
            status(5, 2),
            json!({ "cmdOutput": "****  You have died  ****" }),
            status(10, 4),
        ]);
        let mut engine = EpisodeEngine::new(env, MockActionGenerator::default(), MemoryLogSink::new());

        let result = engine.run_episode(&request(10)).await.unwrap();

        let records = engine.sink().records();
        assert_eq!(records.len(), 3);
        assert!(records[2].done);
        assert!(result.ended_naturally);
        assert_eq!(engine.env().payloads.len(), 1);
    }

    #[tokio::test]
    async fn move_cap_without_done() {
        let env = ScriptedEnv::with_payloads(vec![status(0, 1), status(5, 2), status(5, 3)]);
        let mut engine = EpisodeEngine::new(env, MockActionGenerator::default(), MemoryLogSink::new());

        let result = engine.run_episode(&request(3)).await.unwrap();

        assert!(!result.ended_naturally);
        assert_eq!(result.moves, 3);
        assert_eq!(result.final_score, Some(5));
        assert_eq!(result.log_path, std::path::PathBuf::from(":memory:"));
    }

    #[tokio::test]
    async fn records_carry_move_fields() {
        let env = ScriptedEnv::with_payloads(vec![json!({
            "cmdOutput": "Your score is 57 (total of 350 points), in 12 moves.",
            "inventory": ["sword"]
        })]);
        let mut engine = EpisodeEngine::new(env, MockActionGenerator::default(), MemoryLogSink::new());

        engine.run_episode(&request(1)).await.unwrap();

        let record = &engine.sink().records()[0];
        assert_eq!(record.run_id, "run-1");
        assert_eq!(record.move_idx, 0);
        assert_eq!(record.command, "look");
        assert_eq!(record.score, Some(57));
        assert_eq!(record.moves, Some(12));
        assert_eq!(record.inventory, Some(vec!["sword".to_string()]));
        assert_eq!(record.seed.as_deref(), Some("7"));
        assert!(!record.fallback_used);
        assert!(record.timestamp >= record.started_at);
    }

    #[tokio::test]
    async fn substituted_moves_are_flagged() {
        let env = ScriptedEnv::with_payloads(vec![status(0, 1)]);
        let mut engine = EpisodeEngine::new(env, FailingGenerator::default(), MemoryLogSink::new());

        engine.run_episode(&request(1)).await.unwrap();

        let record = &engine.sink().records()[0];
        assert_eq!(record.command, "look");
        assert!(record.fallback_used);
        assert_eq!(record.tokens_prompt, None);
    }

    #[tokio::test]
    async fn generation_abort_propagates() {
        let env = ScriptedEnv::with_payloads(vec![status(0, 1)]);
        let mut engine = EpisodeEngine::new(env, FailingGenerator::default(), MemoryLogSink::new())
            .with_policy(GenerationPolicy {
                on_failure: OnFailure::Abort,
                ..GenerationPolicy::default()
            });

        let err = engine.run_episode(&request(5)).await.unwrap_err();
        assert!(matches!(
            err,
            EpisodeError::GenerationUnavailable(GenerationFailure::MissingCredential)
        ));
        assert!(engine.sink().records().is_empty());
        assert_eq!(engine.env().closed.len(), 1);
    }

    #[tokio::test]
    async fn communication_failure_aborts_but_keeps_written_records() {
        let env = ScriptedEnv::with_payloads(vec![status(0, 1), status(0, 2)]);
        let mut engine = EpisodeEngine::new(env, MockActionGenerator::default(), MemoryLogSink::new());

        let err = engine.run_episode(&request(5)).await.unwrap_err();

        assert!(matches!(err, EpisodeError::Env(EnvError::Communication(_))));
        assert_eq!(engine.sink().records().len(), 2);
        assert_eq!(engine.env().closed, vec!["player@example.com".to_string()]);
    }

    #[tokio::test]
    async fn session_failure_makes_no_moves() {
        let env = ScriptedEnv {
            fail_new_game: true,
            ..ScriptedEnv::default()
        };
        let mut engine = EpisodeEngine::new(env, FailingGenerator::default(), MemoryLogSink::new());

        let err = engine.run_episode(&request(5)).await.unwrap_err();

        assert!(matches!(err, EpisodeError::Env(EnvError::SessionCreation(_))));
        assert_eq!(engine.generator.calls, 0);
        assert!(engine.env().closed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_delays_each_move() {
        let env = ScriptedEnv::with_payloads(vec![status(0, 1), status(0, 2)]);
        let mut engine = EpisodeEngine::new(env, MockActionGenerator::default(), MemoryLogSink::new())
            .with_pacing(Duration::from_secs(2));

        let before = tokio::time::Instant::now();
        engine.run_episode(&request(2)).await.unwrap();
        assert!(before.elapsed() >= Duration::from_secs(4));
    }
}
