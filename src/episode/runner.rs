//! Sequential multi-episode runs sharing one run id.

use tracing::{error, info};
use uuid::Uuid;

use super::engine::{EpisodeEngine, EpisodeRequest};
use crate::agent::ActionGenerator;
use crate::env::EnvironmentAdapter;
use crate::trajectory::{EpisodeOutcome, LogSink, RunSummary};

/// Parameters shared by every episode of a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub model_name: String,
    pub episodes: usize,
    pub max_moves: usize,
    pub identity: String,
    pub game_title: String,
    pub seed: Option<String>,
}

/// Run `request.episodes` episodes one after another.
///
/// An episode-level failure (transport, unknown session) is recorded as
/// aborted and the run continues. Session creation failures, generation
/// aborts, and sink failures stop the run.
pub async fn run_experiment<E, G, S>(
    engine: &mut EpisodeEngine<E, G, S>,
    request: &RunRequest,
) -> RunSummary
where
    E: EnvironmentAdapter,
    G: ActionGenerator,
    S: LogSink,
{
    let run_id = Uuid::new_v4().to_string();
    let mut episodes = Vec::with_capacity(request.episodes);
    let mut run_aborted = None;

    info!(run_id = %run_id, episodes = request.episodes, model = %request.model_name, "run started");

    for episode_index in 0..request.episodes {
        let episode = EpisodeRequest {
            model_name: request.model_name.clone(),
            max_moves: request.max_moves,
            run_id: run_id.clone(),
            identity: request.identity.clone(),
            game_title: request.game_title.clone(),
            episode_index,
            seed: request.seed.clone(),
        };

        match engine.run_episode(&episode).await {
            Ok(result) => episodes.push(EpisodeOutcome::Completed(result)),
            Err(e) => {
                error!(episode = episode_index, error = %e, "episode aborted");
                let fatal = e.is_run_fatal();
                episodes.push(EpisodeOutcome::Aborted {
                    episode_index,
                    reason: e.to_string(),
                });
                if fatal {
                    run_aborted = Some(e.to_string());
                    break;
                }
            }
        }
    }

    RunSummary {
        run_id,
        episodes,
        run_aborted,
    }
}
