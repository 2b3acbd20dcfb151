//! HTTP adapter for a running ZorkAPI service.
//!
//! The service exposes two endpoints, both `POST` with query parameters:
//! - `{base_url}/newGame?email=<identity>&title=<game>` -- returns a
//!   `userProfile` object whose `email` is the session handle.
//! - `{base_url}/action?email=<identity>&title=<game>&action=<command>` --
//!   returns a payload whose `cmdOutput` carries the game text.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use super::interpret::interpret;
use super::traits::{EnvironmentAdapter, StepResult};
use crate::error::EnvError;

/// Default per-request timeout for the game service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment backed by a remote ZorkAPI server.
#[derive(Debug, Clone)]
pub struct ZorkApiEnv {
    /// Base URL of the server (e.g. `http://localhost:5000`), no trailing slash.
    base_url: String,
    http: reqwest::Client,
}

impl ZorkApiEnv {
    /// Create an adapter pointing at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build game service HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{}/{endpoint}", self.base_url))
            .query(query)
            .send()
            .await
            .with_context(|| format!("failed to reach game service at /{endpoint}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("/{endpoint} returned {status}: {text}");
        }

        resp.json::<Value>()
            .await
            .with_context(|| format!("failed to parse /{endpoint} response"))
    }
}

impl EnvironmentAdapter for ZorkApiEnv {
    async fn new_game(&mut self, identity: &str, game_title: &str) -> Result<String, EnvError> {
        let payload = self
            .post_json("newGame", &[("email", identity), ("title", game_title)])
            .await
            .map_err(|e| EnvError::SessionCreation(format!("{e:#}")))?;

        let session_id = session_handle(&payload).ok_or_else(|| {
            EnvError::SessionCreation(format!("unexpected newGame payload: {payload}"))
        })?;

        tracing::info!(session = %session_id, game = game_title, "ZorkAPI session started");
        Ok(session_id)
    }

    async fn step(
        &mut self,
        identity: &str,
        game_title: &str,
        command: &str,
    ) -> Result<StepResult, EnvError> {
        let payload = self
            .post_json(
                "action",
                &[("email", identity), ("title", game_title), ("action", command)],
            )
            .await
            .map_err(|e| EnvError::Communication(format!("{e:#}")))?;

        let result = interpret(&payload);
        tracing::debug!(command, observation = %result.observation, "ZorkAPI step");
        Ok(result)
    }
}

/// Pull the session handle out of a `newGame` payload.
fn session_handle(payload: &Value) -> Option<String> {
    let profile = payload.get("userProfile")?;
    let handle = match profile {
        Value::Object(_) => profile.get("email")?.as_str()?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    (!handle.is_empty()).then(|| handle.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn env_for(server: &MockServer) -> ZorkApiEnv {
        ZorkApiEnv::new(&format!("{}/", server.uri()), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn session_handle_shapes() {
        assert_eq!(
            session_handle(&json!({ "userProfile": { "email": "player@example.com" } })),
            Some("player@example.com".to_string())
        );
        assert_eq!(
            session_handle(&json!({ "userProfile": "abc" })),
            Some("abc".to_string())
        );
        assert_eq!(session_handle(&json!({ "userProfile": { "email": "" } })), None);
        assert_eq!(session_handle(&json!({ "status": "ok" })), None);
    }

    #[tokio::test]
    async fn new_game_returns_profile_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/newGame"))
            .and(query_param("email", "player@example.com"))
            .and(query_param("title", "zork1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userProfile": { "email": "player@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut env = env_for(&server).await;
        assert_eq!(env.base_url(), server.uri());
        let session = env.new_game("player@example.com", "zork1").await.unwrap();
        assert_eq!(session, "player@example.com");
    }

    #[tokio::test]
    async fn new_game_without_handle_is_session_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/newGame"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&server)
            .await;

        let mut env = env_for(&server).await;
        let err = env.new_game("p", "zork1").await.unwrap_err();
        assert!(matches!(err, EnvError::SessionCreation(_)));
    }

    #[tokio::test]
    async fn new_game_http_failure_is_session_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/newGame"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut env = env_for(&server).await;
        let err = env.new_game("p", "zork1").await.unwrap_err();
        assert!(matches!(err, EnvError::SessionCreation(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn step_interprets_cmd_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action"))
            .and(query_param("action", "score"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cmdOutput": "Your score is 57 (total of 350 points), in 12 moves."
            })))
            .mount(&server)
            .await;

        let mut env = env_for(&server).await;
        let result = env.step("p", "zork1", "score").await.unwrap();
        assert_eq!(result.score, Some(57));
        assert_eq!(result.moves, Some(12));
        assert!(!result.done);
    }

    #[tokio::test]
    async fn step_non_success_is_communication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let mut env = env_for(&server).await;
        let err = env.step("p", "zork1", "look").await.unwrap_err();
        assert!(matches!(err, EnvError::Communication(_)));
    }

    #[tokio::test]
    async fn step_timeout_is_communication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/action"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "cmdOutput": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut env = ZorkApiEnv::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = env.step("p", "zork1", "look").await.unwrap_err();
        assert!(matches!(err, EnvError::Communication(_)));
    }
}
