pub mod completion;
pub mod config;
pub mod context;
pub mod error;
pub mod ipc;
pub mod memory_engine;
pub mod models;
pub mod projection;
pub mod store;

pub use completion::{CompletionBackend, CompletionError, OllamaCompletionClient, NO_ANSWER_PRODUCED};
pub use config::MnemosConfig;
pub use context::{GroundingContext, Triplet};
pub use error::MnemosError;
pub use memory_engine::{HttpMemoryEngine, MemoryEngine, MemoryEngineError, SchemaSetup};
pub use models::{Episode, GraphEdge, GraphNode, GraphSnapshot, NodeRecord, TripletRecord};
pub use projection::resolve_display_name;
pub use store::{GraphStore, Neo4jHttpStore, StoreError};
