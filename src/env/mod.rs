//! Game environment abstractions and concrete implementations.
//!
//! Every backend implements the [`EnvironmentAdapter`] trait so that the
//! episode engine can interact with it uniformly.
//!
//! Included environments:
//! - **ZorkAPI** ([`zork_api`]) -- a remote stateful game service reached
//!   over HTTP.
//! - **Mock** ([`mock`]) -- a deterministic offline game for development and
//!   tests.
//!
//! Raw payloads from either backend go through [`interpret::interpret`].

pub mod interpret;
pub mod mock;
pub mod traits;
pub mod zork_api;

pub use interpret::interpret;
pub use traits::{EnvironmentAdapter, StepResult};

use crate::error::EnvError;

// ---------------------------------------------------------------------------
// AnyEnv: enum dispatch wrapper for dynamic environment selection
// ---------------------------------------------------------------------------

/// An enum wrapper around all concrete environment types, enabling runtime
/// environment selection without `dyn` (which is incompatible with async trait
/// methods).
pub enum AnyEnv {
    ZorkApi(zork_api::ZorkApiEnv),
    Mock(mock::MockZorkEnv),
}

impl EnvironmentAdapter for AnyEnv {
    async fn new_game(&mut self, identity: &str, game_title: &str) -> Result<String, EnvError> {
        match self {
            Self::ZorkApi(e) => e.new_game(identity, game_title).await,
            Self::Mock(e) => e.new_game(identity, game_title).await,
        }
    }

    async fn step(
        &mut self,
        identity: &str,
        game_title: &str,
        command: &str,
    ) -> Result<StepResult, EnvError> {
        match self {
            Self::ZorkApi(e) => e.step(identity, game_title, command).await,
            Self::Mock(e) => e.step(identity, game_title, command).await,
        }
    }

    async fn close(&mut self, session_id: &str) -> Result<(), EnvError> {
        match self {
            Self::ZorkApi(e) => e.close(session_id).await,
            Self::Mock(e) => e.close(session_id).await,
        }
    }
}
