//! Shared fixtures: real collaborator clients pointed at wiremock servers.

#![allow(dead_code)]

use std::sync::Arc;

use mnemos_core::config::{
    CompletionConfig, GraphStoreConfig, HttpConfig, MemoryEngineConfig, MnemosConfig, ServiceConfig,
};
use mnemos_core::{HttpMemoryEngine, Neo4jHttpStore, OllamaCompletionClient};
use mnemos_server::Services;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const NEO4J_COMMIT_PATH: &str = "/db/neo4j/tx/commit";

/// Substring unique to the projector's node query.
pub const NODE_QUERY_MARKER: &str = "RETURN elementId(n)";

/// Substring unique to the serializer's triplet query.
pub const TRIPLET_QUERY_MARKER: &str = "RETURN n.name";

pub struct Mocks {
    pub neo4j: MockServer,
    pub engine: MockServer,
    pub ollama: MockServer,
}

impl Mocks {
    pub async fn start() -> Self {
        Self {
            neo4j: MockServer::start().await,
            engine: MockServer::start().await,
            ollama: MockServer::start().await,
        }
    }

    pub fn config(&self) -> MnemosConfig {
        MnemosConfig {
            service: ServiceConfig {
                socket_path: "/tmp/mnemos-test.sock".to_string(),
                log_level: "info".to_string(),
            },
            graph_store: GraphStoreConfig {
                url: self.neo4j.uri(),
                database: "neo4j".to_string(),
                user: "neo4j".to_string(),
                password: "password".to_string(),
                timeout_seconds: 5,
            },
            memory_engine: MemoryEngineConfig {
                url: self.engine.uri(),
                episode_name: "Manual UI entry".to_string(),
                source_description: "integration tests".to_string(),
                timeout_seconds: 5,
            },
            completion: CompletionConfig {
                url: self.ollama.uri(),
                model: "llama3.1:8b".to_string(),
                timeout_seconds: 5,
                retries: 0,
                retry_delay_ms: 10,
                answer_language: None,
            },
            http: HttpConfig::default(),
        }
    }

    pub fn services(&self) -> Services {
        let config = self.config();
        let store = Neo4jHttpStore::new(&config.graph_store).expect("store client");
        let engine = HttpMemoryEngine::new(&config.memory_engine).expect("engine client");
        let completion =
            OllamaCompletionClient::new(config.completion.clone()).expect("completion client");
        Services::new(Arc::new(store), Arc::new(engine), Arc::new(completion), config)
    }
}

/// Neo4j transactional-endpoint body carrying the given rows.
pub fn neo4j_rows(rows: Vec<Value>) -> Value {
    let data: Vec<Value> = rows
        .into_iter()
        .map(|row| json!({ "row": row, "meta": [] }))
        .collect();
    json!({ "results": [{ "columns": [], "data": data }], "errors": [] })
}

/// Prompts received by the mock completion service, in order.
pub async fn received_prompts(ollama: &MockServer) -> Vec<String> {
    ollama
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter_map(|body| body["prompt"].as_str().map(str::to_string))
        .collect()
}
