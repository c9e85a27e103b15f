//! Ingest subsystem: forwards submitted text to the memory engine
//!
//! Ingestion is best-effort: the engine is asked to build its schema (an "already
//! exists" answer is fine), then the episode is submitted. Failures are logged and
//! reported in the outcome; they never fail the enclosing request.

use mnemos_core::config::MemoryEngineConfig;
use mnemos_core::memory_engine::{MemoryEngine, SchemaSetup};
use mnemos_core::models::Episode;
use uuid::Uuid;

/// Result of one submission. The HTTP layer reports success for all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Submitted { episode_id: Uuid },
    SchemaConflict { episode_id: Uuid },
    Failed { reason: String },
}

impl IngestOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            IngestOutcome::Submitted { .. } => "submitted",
            IngestOutcome::SchemaConflict { .. } => "schema_conflict",
            IngestOutcome::Failed { .. } => "failed",
        }
    }

    pub fn episode_id(&self) -> Option<Uuid> {
        match self {
            IngestOutcome::Submitted { episode_id } | IngestOutcome::SchemaConflict { episode_id } => {
                Some(*episode_id)
            }
            IngestOutcome::Failed { .. } => None,
        }
    }
}

/// Submit `text` as a new episode stamped with the current UTC time.
pub async fn ingest_text(
    text: &str,
    engine: &dyn MemoryEngine,
    config: &MemoryEngineConfig,
) -> IngestOutcome {
    let schema = match engine.ensure_schema().await {
        Ok(SchemaSetup::Created) => SchemaSetup::Created,
        Ok(SchemaSetup::AlreadyExists) => {
            tracing::info!("Indices already exist, continuing");
            SchemaSetup::AlreadyExists
        }
        Err(e) => {
            // Not fatal: the engine may still accept the episode.
            tracing::warn!(error = %e, "Index setup failed");
            SchemaSetup::Created
        }
    };

    let episode = Episode::new(text, &config.episode_name, &config.source_description);

    match engine.add_episode(&episode).await {
        Ok(()) => {
            tracing::info!(
                episode_id = %episode.uuid,
                reference_time = %episode.reference_time,
                chars = text.len(),
                "Episode submitted to memory engine"
            );
            match schema {
                SchemaSetup::Created => IngestOutcome::Submitted {
                    episode_id: episode.uuid,
                },
                SchemaSetup::AlreadyExists => IngestOutcome::SchemaConflict {
                    episode_id: episode.uuid,
                },
            }
        }
        Err(e) => {
            tracing::error!(episode_id = %episode.uuid, error = %e, "Episode submission failed");
            IngestOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
