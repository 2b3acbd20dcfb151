use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::agent::{GenerationPolicy, OnFailure};
use crate::trajectory::DEFAULT_LOG_DIR;

/// Complete configuration for a harness run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub env: EnvConfig,
    pub engine: EngineConfig,
    pub generation: GenerationConfig,
    pub logging: LoggingConfig,
}

/// Game environment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Base URL of the ZorkAPI server. `None` selects the offline mock.
    pub base_url: Option<String>,
    /// Player identity sent to the service (an email address).
    pub identity: String,
    /// Game title to start (default: "zork1").
    pub game_title: String,
    /// Per-request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

/// Turn loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Move cap per episode (default: 50).
    pub max_moves: usize,
    /// Pause between generating a command and submitting it, in
    /// milliseconds (default: 1000).
    pub pacing_ms: u64,
}

/// Action generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// API key; filled from `OPENAI_API_KEY` when empty.
    pub api_key: String,
    /// Sampling temperature (default: 0.6).
    pub temperature: f64,
    /// Completion budget per command (default: 32).
    pub max_tokens: u32,
    /// Extra attempts after a failed generation (default: 0).
    pub retries: u32,
    /// What to do once attempts are exhausted (default: substitute).
    pub on_failure: OnFailure,
    /// Command played on substitution (default: "look").
    pub default_action: String,
}

/// Move log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for run logs (default: "data/raw_runs").
    pub log_dir: String,
    /// Log file name; a timestamped name is used when absent.
    pub log_filename: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            identity: "player@example.com".into(),
            game_title: "zork1".into(),
            timeout_secs: 10,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_moves: 50,
            pacing_ms: 1000,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let policy = GenerationPolicy::default();
        Self {
            api_base: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            temperature: 0.6,
            max_tokens: 32,
            retries: policy.retries,
            on_failure: policy.on_failure,
            default_action: policy.default_action,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: DEFAULT_LOG_DIR.into(),
            log_filename: None,
        }
    }
}

impl HarnessConfig {
    /// Load from a JSON file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .generation_policy()
            .validate()
            .with_context(|| format!("Invalid generation settings in {}", path.display()))?;
        Ok(config)
    }

    /// Fill the API key from `OPENAI_API_KEY` when the file left it empty.
    pub fn apply_env_key(&mut self, key: Option<String>) {
        if let Some(key) = key {
            if self.generation.api_key.is_empty() {
                self.generation.api_key = key;
            }
        }
    }

    pub fn generation_policy(&self) -> GenerationPolicy {
        GenerationPolicy {
            retries: self.generation.retries,
            on_failure: self.generation.on_failure,
            default_action: self.generation.default_action.clone(),
        }
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.engine.pacing_ms)
    }

    pub fn env_timeout(&self) -> Duration {
        Duration::from_secs(self.env.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.env.base_url, None);
        assert_eq!(config.env.game_title, "zork1");
        assert_eq!(config.engine.max_moves, 50);
        assert_eq!(config.pacing(), Duration::from_secs(1));
        assert_eq!(config.env_timeout(), Duration::from_secs(10));
        assert_eq!(config.generation_policy(), GenerationPolicy::default());
        assert_eq!(config.logging.log_dir, "data/raw_runs");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        std::fs::write(
            &path,
            r#"{ "env": { "base_url": "http://localhost:5000" }, "generation": { "on_failure": "abort", "retries": 2 } }"#,
        )
        .unwrap();

        let config = HarnessConfig::load(Some(&path)).unwrap();
        assert_eq!(config.env.base_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.env.identity, "player@example.com");
        assert_eq!(config.generation.on_failure, OnFailure::Abort);
        assert_eq!(config.generation_policy().retries, 2);
        assert_eq!(config.engine.pacing_ms, 1000);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = HarnessConfig::load(Some(Path::new("/nonexistent/harness.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn blank_default_action_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("empty.json", r#"{ "generation": { "default_action": "" } }"#),
            ("spaces.json", r#"{ "generation": { "default_action": "   " } }"#),
        ] {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            let err = HarnessConfig::load(Some(&path)).unwrap_err();
            assert!(format!("{err:#}").contains("default_action"));
        }
    }

    #[test]
    fn env_key_does_not_override_file_key() {
        let mut config = HarnessConfig::default();
        config.apply_env_key(Some("from-env".into()));
        assert_eq!(config.generation.api_key, "from-env");

        config.apply_env_key(Some("other".into()));
        assert_eq!(config.generation.api_key, "from-env");

        let mut untouched = HarnessConfig::default();
        untouched.apply_env_key(None);
        assert!(untouched.generation.api_key.is_empty());
    }
}
