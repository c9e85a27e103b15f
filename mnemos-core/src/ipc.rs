use serde::{Deserialize, Serialize};

use crate::error::MnemosError;

pub const PROTOCOL: &str = "mnemos/1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MnemosRequest {
    Ping,
    Health,
    Ingest {
        text: String,
    },
    Graph,
    Reset,
    Ask {
        question: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MnemosResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl MnemosResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Decode one MessagePack frame into a request.
pub fn decode_request(bytes: &[u8]) -> Result<MnemosRequest, MnemosError> {
    rmp_serde::from_slice(bytes).map_err(|e| MnemosError::Ipc(format!("Deserialization error: {}", e)))
}

/// Encode a response with named fields so non-Rust clients can read it.
pub fn encode_response(response: &MnemosResponse) -> Result<Vec<u8>, MnemosError> {
    rmp_serde::to_vec_named(response).map_err(|e| MnemosError::Ipc(format!("Serialization error: {}", e)))
}
