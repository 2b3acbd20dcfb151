//! Agent module: producing the next game command.
//!
//! - [`agent`] -- the [`ActionGenerator`] trait and the LLM-backed generator.
//! - [`mock`] -- a deterministic offline generator (`--model mock`).
//! - [`policy`] -- retry / substitute / abort handling for failed generations.

pub mod agent;
pub mod mock;
pub mod policy;

pub use agent::{clean_action, ActionGeneration, ActionGenerator, Generation, LlmActionGenerator};
pub use mock::{MockActionGenerator, MOCK_MODEL};
pub use policy::{GenerationPolicy, OnFailure, ResolvedAction};

/// Enum dispatch over the concrete generators, mirroring [`crate::env::AnyEnv`].
pub enum AnyGenerator {
    Llm(LlmActionGenerator),
    Mock(MockActionGenerator),
}

impl ActionGenerator for AnyGenerator {
    async fn generate(&mut self, model_name: &str, prompt: &str) -> Generation {
        match self {
            Self::Llm(g) => g.generate(model_name, prompt).await,
            Self::Mock(g) => g.generate(model_name, prompt).await,
        }
    }
}
