//! zork-harness: run LLM agents through Zork episodes.
//!
//! Runs one or more episodes sequentially under a single run id, writes every
//! move to a JSON Lines log, and prints a per-episode summary. Without
//! `--base-url` the offline mock game is used; `--model mock` selects the
//! offline action generator.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zork_harness::agent::{
    AnyGenerator, LlmActionGenerator, MockActionGenerator, OnFailure, MOCK_MODEL,
};
use zork_harness::config::HarnessConfig;
use zork_harness::env::mock::MockZorkEnv;
use zork_harness::env::zork_api::ZorkApiEnv;
use zork_harness::env::AnyEnv;
use zork_harness::episode::{run_experiment, EpisodeEngine, RunRequest};
use zork_harness::model::LlmClient;
use zork_harness::trajectory::{EpisodeOutcome, JsonlLogSink, RunSummary};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Run Zork LLM experiments.
#[derive(Parser)]
#[command(name = "zork-harness", version, about)]
struct Cli {
    /// Model name (e.g. gpt-4.1-mini), or "mock" for the offline generator.
    #[arg(long)]
    model: String,

    /// Number of episodes to run.
    #[arg(long, default_value_t = 1)]
    episodes: usize,

    /// Max moves per episode (overrides the config file).
    #[arg(long)]
    max_moves: Option<usize>,

    /// Base URL for ZorkAPI. If omitted, the mock environment is used.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory for move logs.
    #[arg(long)]
    log_dir: Option<String>,

    /// Optional log file name inside the log directory.
    #[arg(long)]
    log_filename: Option<String>,

    /// Optional run-level seed recorded in the log for reproducibility.
    #[arg(long)]
    seed: Option<String>,

    /// Player identity sent to the game service.
    #[arg(long)]
    identity: Option<String>,

    /// Game title to play.
    #[arg(long)]
    game: Option<String>,

    /// Pause between generating and submitting each command, in milliseconds.
    #[arg(long)]
    pace_ms: Option<u64>,

    /// What to do when the model cannot produce a command.
    #[arg(long, value_enum)]
    on_generation_failure: Option<OnFailure>,

    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layer command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(max_moves) = self.max_moves {
            config.engine.max_moves = max_moves;
        }
        if let Some(base_url) = &self.base_url {
            config.env.base_url = Some(base_url.clone());
        }
        if let Some(log_dir) = &self.log_dir {
            config.logging.log_dir = log_dir.clone();
        }
        if let Some(log_filename) = &self.log_filename {
            config.logging.log_filename = Some(log_filename.clone());
        }
        if let Some(identity) = &self.identity {
            config.env.identity = identity.clone();
        }
        if let Some(game) = &self.game {
            config.env.game_title = game.clone();
        }
        if let Some(pace_ms) = self.pace_ms {
            config.engine.pacing_ms = pace_ms;
        }
        if let Some(on_failure) = self.on_generation_failure {
            config.generation.on_failure = on_failure;
        }
    }
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    config.apply_env_key(std::env::var("OPENAI_API_KEY").ok());
    cli.apply(&mut config);

    let env = create_env(&config)?;
    let generator = create_generator(&config, &cli.model, cli.seed.as_deref())?;
    let sink = JsonlLogSink::create(
        &config.logging.log_dir,
        config.logging.log_filename.as_deref(),
    )?;

    let mut engine = EpisodeEngine::new(env, generator, sink)
        .with_policy(config.generation_policy())
        .with_pacing(config.pacing());

    let request = RunRequest {
        model_name: cli.model.clone(),
        episodes: cli.episodes,
        max_moves: config.engine.max_moves,
        identity: config.env.identity.clone(),
        game_title: config.env.game_title.clone(),
        seed: cli.seed.clone(),
    };

    let summary = run_experiment(&mut engine, &request).await;
    print_summary(&summary);

    Ok(if summary.run_aborted.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

fn create_env(config: &HarnessConfig) -> Result<AnyEnv> {
    match &config.env.base_url {
        Some(base_url) => {
            tracing::info!(base_url = %base_url, "Using live ZorkAPI environment");
            Ok(AnyEnv::ZorkApi(ZorkApiEnv::new(
                base_url,
                config.env_timeout(),
            )?))
        }
        None => {
            tracing::info!("Using mock Zork environment");
            Ok(AnyEnv::Mock(MockZorkEnv::new()))
        }
    }
}

fn create_generator(
    config: &HarnessConfig,
    model: &str,
    seed: Option<&str>,
) -> Result<AnyGenerator> {
    if model == MOCK_MODEL {
        tracing::info!("Using mock action generator");
        return Ok(AnyGenerator::Mock(MockActionGenerator::new(seed)));
    }

    if config.generation.api_key.is_empty() {
        tracing::warn!(
            on_failure = ?config.generation.on_failure,
            "No API key configured; generation failures will follow the fallback policy"
        );
    }

    let client = LlmClient::new(&config.generation.api_base, &config.generation.api_key)?;
    Ok(AnyGenerator::Llm(LlmActionGenerator::new(
        client,
        config.generation.temperature,
        config.generation.max_tokens,
    )))
}

fn print_summary(summary: &RunSummary) {
    println!("=== Run summary ({}) ===", summary.run_id);
    for outcome in &summary.episodes {
        match outcome {
            EpisodeOutcome::Completed(res) => {
                let score = res
                    .final_score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!(
                    "Episode {}: score={score} moves={} end={} log={}",
                    res.episode_index + 1,
                    res.moves,
                    res.end_state(),
                    res.log_path.display()
                );
            }
            EpisodeOutcome::Aborted {
                episode_index,
                reason,
            } => {
                println!("Episode {}: aborted ({reason})", episode_index + 1);
            }
        }
    }
    if let Some(reason) = &summary.run_aborted {
        println!("Run aborted: {reason}");
    }
}
