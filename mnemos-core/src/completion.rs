//! Completion module for Mnemos: language-model text generation
//!
//! Provides a `CompletionBackend` trait with an Ollama implementation that calls
//! `POST /api/generate` with streaming disabled. Callers need the full text, never
//! partial tokens.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::config::CompletionConfig;

/// Returned when the service answers successfully but produces no text.
pub const NO_ANSWER_PRODUCED: &str = "No answer could be produced.";

// ============================================================================
// CompletionBackend trait
// ============================================================================

/// Abstraction over completion providers.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate text for `prompt` with the given model.
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError>;

    /// Model used when the caller has no preference.
    fn default_model(&self) -> &str;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

/// Completion errors
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("All {attempts} completion attempts failed: {last}")]
    RetryExhausted { attempts: usize, last: String },
}

// ============================================================================
// Ollama API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: Option<String>,
}

// ============================================================================
// OllamaCompletionClient
// ============================================================================

/// Ollama completion client: calls the `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaCompletionClient {
    client: Client,
    config: CompletionConfig,
    base_url: String,
}

impl OllamaCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let base_url = config.url.clone();
        Self::with_base_url(config, base_url)
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        config: CompletionConfig,
        base_url: String,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn complete_once(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Completion API error");

            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        Ok(body
            .response
            .unwrap_or_else(|| NO_ANSWER_PRODUCED.to_string()))
    }
}

#[async_trait]
impl CompletionBackend for OllamaCompletionClient {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        if self.config.retries == 0 {
            return self.complete_once(prompt, model).await;
        }

        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.retries);

        match Retry::spawn(retry_strategy, || self.complete_once(prompt, model)).await {
            Ok(text) => Ok(text),
            Err(e) => {
                let attempts = self.config.retries + 1;
                tracing::error!(attempts, error = %e, "All completion attempts failed");
                Err(CompletionError::RetryExhausted {
                    attempts,
                    last: e.to_string(),
                })
            }
        }
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(retries: usize) -> CompletionConfig {
        CompletionConfig {
            url: "http://unused".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_seconds: 5,
            retries,
            retry_delay_ms: 10,
            answer_language: None,
        }
    }

    fn client(server: &MockServer, retries: usize) -> OllamaCompletionClient {
        OllamaCompletionClient::with_base_url(test_config(retries), server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({
                "model": "llama3.1:8b",
                "prompt": "hello",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1:8b",
                "response": "Hi there",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, 0).complete("hello", "llama3.1:8b").await.unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn test_missing_response_field_returns_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
            .mount(&server)
            .await;

        let text = client(&server, 0).complete("q", "m").await.unwrap();
        assert_eq!(text, NO_ANSWER_PRODUCED);
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "model 'x' not found" })),
            )
            .mount(&server)
            .await;

        let err = client(&server, 0).complete("q", "x").await.unwrap_err();
        match err {
            CompletionError::Api { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "model 'x' not found");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server, 0).complete("q", "m").await.unwrap_err();
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_retries_then_reports_exhaustion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 2).complete("q", "m").await.unwrap_err();
        match err {
            CompletionError::RetryExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.contains("boom"));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        let config = test_config(0);
        let client =
            OllamaCompletionClient::with_base_url(config, "http://127.0.0.1:1".to_string()).unwrap();

        let err = client.complete("q", "m").await.unwrap_err();
        assert!(matches!(err, CompletionError::Http(_)));
        assert!(!err.to_string().is_empty());
    }
}
