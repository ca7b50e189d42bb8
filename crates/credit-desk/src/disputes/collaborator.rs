//! Gemini `generateContent` client behind the [`DraftCollaborator`] seam.
//!
//! Calls are plain request/response (no streaming), carry a per-request
//! timeout from configuration, and are never retried: the collaborator has no
//! contractual SLA, so failures surface immediately as typed errors and the
//! wizard decides how to render them.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::bureaus::CreditAccount;
use crate::config::CollaboratorConfig;
use crate::disputes::prompt;
use crate::disputes::wizard::DisputeRound;

/// Typed failure of a collaborator call. The wizard collapses these into
/// fallback prose at the rendering boundary.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("collaborator returned status {0}")]
    Status(StatusCode),
    #[error("collaborator returned no usable text")]
    EmptyResponse,
    #[error("collaborator call timed out after {0} seconds")]
    TimedOut(u64),
}

/// The AI text-generation contract the wizard drives: opaque prose in, opaque
/// prose out, wrapped in a discriminated result.
#[async_trait]
pub trait DraftCollaborator: Send + Sync {
    /// Summarize 2-3 factual cross-bureau inconsistencies for one account.
    async fn analyze(&self, account: &CreditAccount) -> Result<String, CollaboratorError>;

    /// Draft a dispute letter from the account, the analysis text, and the
    /// selected round.
    async fn draft_letter(
        &self,
        account: &CreditAccount,
        analysis: &str,
        round: DisputeRound,
    ) -> Result<String, CollaboratorError>;
}

/// Low-level Gemini API client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    fn new(config: &CollaboratorConfig, api_key: String) -> Result<Self, CollaboratorError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "collaborator call");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "collaborator rejected the request");
            return Err(CollaboratorError::Status(status));
        }

        let payload: Value = response.json().await?;
        extract_text(&payload)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CollaboratorError::EmptyResponse)
    }
}

/// High-level wrapper that is either an active Gemini client or disabled
/// when no API key is configured.
pub enum Collaborator {
    Active(GeminiClient),
    Disabled,
}

impl Collaborator {
    /// Build a collaborator from configuration. A missing or empty API key
    /// yields the disabled variant; every call then fails as
    /// [`CollaboratorError::NotConfigured`].
    pub fn from_config(config: &CollaboratorConfig) -> Result<Self, CollaboratorError> {
        match &config.api_key {
            Some(key) if !key.trim().is_empty() => {
                Ok(Collaborator::Active(GeminiClient::new(config, key.clone())?))
            }
            _ => Ok(Collaborator::Disabled),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Collaborator::Active(_))
    }
}

#[async_trait]
impl DraftCollaborator for Collaborator {
    async fn analyze(&self, account: &CreditAccount) -> Result<String, CollaboratorError> {
        match self {
            Collaborator::Active(client) => {
                client.generate(&prompt::analysis_prompt(account)).await
            }
            Collaborator::Disabled => Err(CollaboratorError::NotConfigured),
        }
    }

    async fn draft_letter(
        &self,
        account: &CreditAccount,
        analysis: &str,
        round: DisputeRound,
    ) -> Result<String, CollaboratorError> {
        match self {
            Collaborator::Active(client) => {
                client
                    .generate(&prompt::letter_prompt(account, analysis, round))
                    .await
            }
            Collaborator::Disabled => Err(CollaboratorError::NotConfigured),
        }
    }
}

/// Extract the concatenated text parts of the first candidate.
///
/// Expected shape:
/// `{ "candidates": [ { "content": { "parts": [ { "text": "..." } ] } } ] }`
pub(crate) fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut text = String::new();
    for part in parts {
        if let Some(fragment) = part.get("text").and_then(Value::as_str) {
            text.push_str(fragment);
        }
    }

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(api_key: Option<&str>, base_url: &str) -> CollaboratorConfig {
        CollaboratorConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-3-flash-preview".to_string(),
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(2),
        }
    }

    fn chase() -> CreditAccount {
        crate::bureaus::catalog::sample_accounts()
            .into_iter()
            .next()
            .expect("catalog is non-empty")
    }

    // -- Response JSON parsing --

    #[test]
    fn extract_text_joins_candidate_parts() {
        let payload = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Balance mismatch at TransUnion." },
                        { "text": " Date drift at Equifax." }
                    ],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(
            extract_text(&payload).as_deref(),
            Some("Balance mismatch at TransUnion. Date drift at Equifax.")
        );
    }

    #[test]
    fn extract_text_handles_missing_candidates() {
        let payload = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(extract_text(&payload), None);
    }

    #[test]
    fn extract_text_handles_empty_parts() {
        let payload = serde_json::json!({
            "candidates": [{ "content": { "parts": [] } }]
        });
        assert_eq!(extract_text(&payload), None);
    }

    // -- Configuration paths --

    #[test]
    fn missing_api_key_builds_disabled_collaborator() {
        let collaborator =
            Collaborator::from_config(&test_config(None, "https://example.test")).expect("builds");
        assert!(!collaborator.is_active());
    }

    #[test]
    fn blank_api_key_builds_disabled_collaborator() {
        let collaborator = Collaborator::from_config(&test_config(Some("  "), "https://example.test"))
            .expect("builds");
        assert!(!collaborator.is_active());
    }

    #[test]
    fn api_key_builds_active_collaborator() {
        let collaborator =
            Collaborator::from_config(&test_config(Some("key-123"), "https://example.test"))
                .expect("builds");
        assert!(collaborator.is_active());
    }

    #[tokio::test]
    async fn disabled_collaborator_fails_every_call() {
        let collaborator =
            Collaborator::from_config(&test_config(None, "https://example.test")).expect("builds");
        let account = chase();

        let err = collaborator.analyze(&account).await.expect_err("disabled");
        assert!(matches!(err, CollaboratorError::NotConfigured));

        let err = collaborator
            .draft_letter(&account, "analysis", DisputeRound::Round2Bureau)
            .await
            .expect_err("disabled");
        assert!(matches!(err, CollaboratorError::NotConfigured));
    }

    // -- Integration-style tests against a mock HTTP server --

    async fn serve_once(response: String) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("binds");
        let addr = listener.local_addr().expect("has addr");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        addr
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        )
    }

    #[tokio::test]
    async fn mock_server_round_trip_returns_letter_text() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Dear [My Name] placeholder letter." }] }
            }]
        })
        .to_string();
        let addr = serve_once(http_response("200 OK", &body)).await;

        let collaborator = Collaborator::from_config(&test_config(
            Some("key-123"),
            &format!("http://{addr}"),
        ))
        .expect("builds");

        let letter = collaborator
            .draft_letter(&chase(), "- balance drift", DisputeRound::Round1Creditor)
            .await
            .expect("letter drafted");
        assert_eq!(letter, "Dear [My Name] placeholder letter.");
    }

    #[tokio::test]
    async fn mock_server_error_status_is_typed() {
        let addr = serve_once(http_response(
            "429 Too Many Requests",
            "{\"error\":{\"message\":\"quota\"}}",
        ))
        .await;

        let collaborator = Collaborator::from_config(&test_config(
            Some("key-123"),
            &format!("http://{addr}"),
        ))
        .expect("builds");

        let err = collaborator.analyze(&chase()).await.expect_err("rejected");
        match err {
            CollaboratorError::Status(status) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS)
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_server_blank_text_is_empty_response() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        })
        .to_string();
        let addr = serve_once(http_response("200 OK", &body)).await;

        let collaborator = Collaborator::from_config(&test_config(
            Some("key-123"),
            &format!("http://{addr}"),
        ))
        .expect("builds");

        let err = collaborator.analyze(&chase()).await.expect_err("blank text");
        assert!(matches!(err, CollaboratorError::EmptyResponse));
    }
}
