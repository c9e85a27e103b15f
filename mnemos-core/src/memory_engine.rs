//! Memory engine client: hands episodes to the extraction service
//!
//! The engine owns entity/relationship extraction and the graph upsert. Mnemos only:
//! - asks it to build its indices and constraints (idempotent)
//! - submits episodes with a mandatory UTC reference time

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::config::MemoryEngineConfig;
use crate::models::Episode;

/// Marker the graph database uses when an index or constraint already exists.
const SCHEMA_EXISTS_MARKER: &str = "EquivalentSchemaRuleAlreadyExists";

/// Outcome of an index/constraint build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSetup {
    Created,
    AlreadyExists,
}

#[derive(Error, Debug)]
pub enum MemoryEngineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Memory engine returned HTTP {code}: {message}")]
    Api { code: u16, message: String },
}

#[async_trait]
pub trait MemoryEngine: Send + Sync {
    /// Build indices and constraints. An "already exists" answer is not an error.
    async fn ensure_schema(&self) -> Result<SchemaSetup, MemoryEngineError>;

    /// Submit one episode for extraction. Returns once the engine accepted it.
    async fn add_episode(&self, episode: &Episode) -> Result<(), MemoryEngineError>;

    fn name(&self) -> &str;
}

/// HTTP client for the memory engine service.
#[derive(Debug, Clone)]
pub struct HttpMemoryEngine {
    client: Client,
    base_url: String,
}

impl HttpMemoryEngine {
    pub fn new(config: &MemoryEngineConfig) -> Result<Self, MemoryEngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MemoryEngine for HttpMemoryEngine {
    async fn ensure_schema(&self) -> Result<SchemaSetup, MemoryEngineError> {
        let url = format!("{}/indices", self.base_url);
        let response = self.client.post(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(SchemaSetup::Created);
        }

        let message = response.text().await.unwrap_or_default();
        if is_schema_conflict(status, &message) {
            return Ok(SchemaSetup::AlreadyExists);
        }

        Err(MemoryEngineError::Api {
            code: status.as_u16(),
            message,
        })
    }

    async fn add_episode(&self, episode: &Episode) -> Result<(), MemoryEngineError> {
        let url = format!("{}/episodes", self.base_url);
        let response = self.client.post(&url).json(episode).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MemoryEngineError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn is_schema_conflict(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        || body.contains(SCHEMA_EXISTS_MARKER)
        || body.to_ascii_lowercase().contains("already exists")
}
