//! Graph store adapter
//!
//! Provides a `GraphStore` trait over the property-graph database and a Neo4j
//! implementation that speaks the HTTP transactional Cypher endpoint
//! (`POST /db/{database}/tx/commit`). The store is the only source of truth; nothing
//! here caches graph state between calls.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::GraphStoreConfig;
use crate::models::{NodeRecord, TripletRecord};

/// Every node, left-joined with zero or one outgoing relationship per row.
pub const NODE_QUERY: &str = r#"
MATCH (n)
OPTIONAL MATCH (n)-[r]->(m)
RETURN elementId(n) AS s_id, n.name AS s_name, labels(n)[0] AS s_label,
       elementId(m) AS t_id, m.name AS t_name, labels(m)[0] AS t_label,
       type(r) AS relation
"#;

/// Every directed edge with both endpoints present.
pub const TRIPLET_QUERY: &str = r#"
MATCH (n)-[r]->(m)
RETURN n.name AS s_name, labels(n)[0] AS s_label,
       type(r) AS relation,
       m.name AS t_name, labels(m)[0] AS t_label
"#;

/// Removes every node together with its relationships.
pub const RESET_QUERY: &str = "MATCH (n) DETACH DELETE n";

pub const VERSION_QUERY: &str =
    "CALL dbms.components() YIELD versions RETURN versions[0] AS version LIMIT 1";

// ============================================================================
// GraphStore trait
// ============================================================================

/// Read/write access to the knowledge graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Rows for the visualization projection.
    async fn node_records(&self) -> Result<Vec<NodeRecord>, StoreError>;

    /// Rows for the grounding context.
    async fn triplet_records(&self) -> Result<Vec<TripletRecord>, StoreError>;

    /// Delete every node and relationship. Safe to repeat.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Server version string, used by health checks.
    async fn version(&self) -> Result<String, StoreError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Graph store returned HTTP {code}: {message}")]
    Api { code: u16, message: String },

    #[error("Cypher error {code}: {message}")]
    Query { code: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Neo4j HTTP API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct CypherRequest<'a> {
    statements: Vec<CypherStatement<'a>>,
}

#[derive(Debug, Serialize)]
struct CypherStatement<'a> {
    statement: &'a str,
}

#[derive(Debug, Deserialize)]
struct CypherResponse {
    #[serde(default)]
    results: Vec<CypherResult>,
    #[serde(default)]
    errors: Vec<CypherError>,
}

#[derive(Debug, Deserialize)]
struct CypherResult {
    #[serde(default)]
    data: Vec<CypherRow>,
}

#[derive(Debug, Deserialize)]
struct CypherRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CypherError {
    code: String,
    message: String,
}

// ============================================================================
// Neo4jHttpStore
// ============================================================================

/// Neo4j store client over the HTTP API.
#[derive(Debug, Clone)]
pub struct Neo4jHttpStore {
    client: Client,
    user: String,
    password: String,
    endpoint: String,
}

impl Neo4jHttpStore {
    pub fn new(config: &GraphStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            user: config.user.clone(),
            password: config.resolved_password(),
            endpoint: format!(
                "{}/db/{}/tx/commit",
                config.url.trim_end_matches('/'),
                config.database
            ),
        })
    }

    /// Build the client and verify the database answers before handing it out.
    pub async fn connect(config: &GraphStoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;
        let version = store.version().await?;
        tracing::info!(url = %config.url, database = %config.database, version = %version, "Connected to graph store");
        Ok(store)
    }

    /// Run one statement in an auto-commit transaction and return its rows.
    async fn run(&self, statement: &str) -> Result<Vec<Vec<Value>>, StoreError> {
        let request = CypherRequest {
            statements: vec![CypherStatement { statement }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(code = status.as_u16(), message = %message, "Graph store HTTP error");
            return Err(StoreError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: CypherResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if let Some(err) = body.errors.into_iter().next() {
            tracing::error!(code = %err.code, message = %err.message, "Cypher statement failed");
            return Err(StoreError::Query {
                code: err.code,
                message: err.message,
            });
        }

        Ok(body
            .results
            .into_iter()
            .next()
            .map(|r| r.data.into_iter().map(|d| d.row).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl GraphStore for Neo4jHttpStore {
    async fn node_records(&self) -> Result<Vec<NodeRecord>, StoreError> {
        let rows = self.run(NODE_QUERY).await?;
        Ok(rows
            .iter()
            .map(|row| NodeRecord {
                source_id: cell(row, 0),
                source_name: cell(row, 1),
                source_label: cell(row, 2),
                target_id: cell(row, 3),
                target_name: cell(row, 4),
                target_label: cell(row, 5),
                relation: cell(row, 6),
            })
            .collect())
    }

    async fn triplet_records(&self) -> Result<Vec<TripletRecord>, StoreError> {
        let rows = self.run(TRIPLET_QUERY).await?;
        Ok(rows
            .iter()
            .map(|row| TripletRecord {
                source_name: cell(row, 0),
                source_label: cell(row, 1),
                relation: cell(row, 2).unwrap_or_default(),
                target_name: cell(row, 3),
                target_label: cell(row, 4),
            })
            .collect())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.run(RESET_QUERY).await?;
        Ok(())
    }

    async fn version(&self) -> Result<String, StoreError> {
        let rows = self.run(VERSION_QUERY).await?;
        rows.first()
            .and_then(|row| cell(row, 0))
            .ok_or_else(|| StoreError::InvalidResponse("no version row".to_string()))
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}

/// Read one column as text. Null or missing → `None`; non-string scalars keep their
/// JSON rendering so numeric names still display.
fn cell(row: &[Value], index: usize) -> Option<String> {
    match row.get(index)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
