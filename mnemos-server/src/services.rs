//! Collaborator handles shared by the HTTP and IPC front ends
//!
//! Built once at startup and passed explicitly to every request path. Dropping the
//! last clone releases the underlying HTTP clients.

use std::sync::Arc;

use mnemos_core::{
    CompletionBackend, GraphStore, HttpMemoryEngine, MemoryEngine, MnemosConfig, MnemosError,
    Neo4jHttpStore, OllamaCompletionClient,
};

#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn GraphStore>,
    pub engine: Arc<dyn MemoryEngine>,
    pub completion: Arc<dyn CompletionBackend>,
    pub config: MnemosConfig,
}

impl Services {
    pub fn new(
        store: Arc<dyn GraphStore>,
        engine: Arc<dyn MemoryEngine>,
        completion: Arc<dyn CompletionBackend>,
        config: MnemosConfig,
    ) -> Self {
        Self {
            store,
            engine,
            completion,
            config,
        }
    }

    /// Connect to the graph store (verifying it answers) and build the HTTP
    /// clients for the memory engine and the completion service.
    pub async fn connect(config: MnemosConfig) -> Result<Self, MnemosError> {
        let store = Neo4jHttpStore::connect(&config.graph_store).await?;
        let engine = HttpMemoryEngine::new(&config.memory_engine)?;
        let completion = OllamaCompletionClient::new(config.completion.clone())?;

        tracing::info!(
            memory_engine = %config.memory_engine.url,
            completion = %config.completion.url,
            model = %config.completion.model,
            "Collaborator clients ready"
        );

        Ok(Self::new(
            Arc::new(store),
            Arc::new(engine),
            Arc::new(completion),
            config,
        ))
    }
}
