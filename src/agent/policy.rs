//! What to do when a generator cannot produce an action.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::agent::{ActionGeneration, ActionGenerator, Generation};
use crate::error::GenerationFailure;

/// Behaviour once all generation attempts for a move have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Play the configured default command and keep going.
    Substitute,
    /// Stop the run.
    Abort,
}

/// Explicit, configurable fallback policy for action generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub on_failure: OnFailure,
    /// Command played when substituting.
    pub default_action: String,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            on_failure: OnFailure::Substitute,
            default_action: "look".to_string(),
        }
    }
}

/// The action chosen for a move and whether it came from the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAction {
    pub generation: ActionGeneration,
    pub fallback_used: bool,
}

impl GenerationPolicy {
    /// Reject a policy whose substitute command would be empty.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_action.trim().is_empty() {
            anyhow::bail!("default_action must be a non-empty command");
        }
        Ok(())
    }

    /// Ask `generator` for an action, applying retries and the failure policy.
    pub async fn resolve<G: ActionGenerator>(
        &self,
        generator: &mut G,
        model_name: &str,
        prompt: &str,
    ) -> Result<ResolvedAction, GenerationFailure> {
        let mut last_failure = None;

        for attempt in 0..=self.retries {
            match generator.generate(model_name, prompt).await {
                Generation::Generated(generation) => {
                    return Ok(ResolvedAction {
                        generation,
                        fallback_used: false,
                    });
                }
                Generation::Failed(failure) => {
                    warn!(model = model_name, attempt, reason = %failure, "action generation failed");
                    last_failure = Some(failure);
                }
            }
        }

        let failure = last_failure.unwrap_or(GenerationFailure::EmptyCompletion);
        match self.on_failure {
            OnFailure::Substitute => {
                warn!(
                    model = model_name,
                    action = %self.default_action,
                    reason = %failure,
                    "substituting default action"
                );
                Ok(ResolvedAction {
                    generation: ActionGeneration::untracked(self.default_action.clone()),
                    fallback_used: true,
                })
            }
            OnFailure::Abort => Err(failure),
        }
    }
}
