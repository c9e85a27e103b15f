use thiserror::Error;

use crate::completion::CompletionError;
use crate::memory_engine::MemoryEngineError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum MnemosError {
    #[error("Graph store error: {0}")]
    Store(#[from] StoreError),

    #[error("Memory engine error: {0}")]
    MemoryEngine(#[from] MemoryEngineError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPC error: {0}")]
    Ipc(String),
}
