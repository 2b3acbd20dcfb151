//! Typed error taxonomy for the harness.
//!
//! Environment and generation failures are modelled as enums so that the run
//! driver can decide whether a failure ends one episode or the whole run.
//! Glue code (config loading, CLI, sink I/O) keeps using `anyhow::Result`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Environment errors
// ---------------------------------------------------------------------------

/// Failures raised by an [`EnvironmentAdapter`](crate::env::EnvironmentAdapter).
#[derive(Debug, Error)]
pub enum EnvError {
    /// The remote call failed or the payload carried no session handle.
    #[error("session creation failed: {0}")]
    SessionCreation(String),

    /// Transport failure while submitting a command (non-2xx, timeout,
    /// undecodable body).
    #[error("communication with game service failed: {0}")]
    Communication(String),

    /// The adapter has no session with this handle.
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

impl EnvError {
    /// Whether this failure should stop the whole run rather than one episode.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::SessionCreation(_))
    }
}

// ---------------------------------------------------------------------------
// Generation failures
// ---------------------------------------------------------------------------

/// Why an action generator could not produce a real action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("provider error: {0}")]
    Provider(String),

    #[error("completion contained no usable command")]
    EmptyCompletion,
}

// ---------------------------------------------------------------------------
// Episode errors
// ---------------------------------------------------------------------------

/// Reasons an episode was aborted before reaching a terminal state.
#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Generation failed and the configured policy is to abort.
    #[error("action generation unavailable: {0}")]
    GenerationUnavailable(GenerationFailure),

    #[error("log sink: {0:#}")]
    LogSink(anyhow::Error),
}

impl EpisodeError {
    /// Whether the run driver should stop scheduling further episodes.
    pub fn is_run_fatal(&self) -> bool {
        match self {
            Self::Env(e) => e.is_run_fatal(),
            Self::GenerationUnavailable(_) => true,
            Self::LogSink(_) => true,
        }
    }
}
