//! Mnemos HTTP REST API
//!
//! Axum-based HTTP server consumed by the graph web UI.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function. The inner functions are directly testable without axum dispatch
//! machinery.
//!
//! Endpoints:
//! - POST /api/process: submit text to the memory engine
//! - GET  /api/graph: `{nodes, links}` snapshot for the 3D viewer
//! - POST /api/clear: delete every node and relationship
//! - POST /api/ask: graph RAG question answering
//! - GET  /health: health check with graph store status
//! - GET  /version: server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use mnemos_core::ipc::{MnemosRequest, MnemosResponse, PROTOCOL};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::services::Services;

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<Services>) -> Router {
    Router::new()
        .route("/api/process", post(process_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    services: Services,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", services.config.http.host, services.config.http.port);
    let state = Arc::new(services);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Mnemos HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct ProcessRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AskRequest {
    pub question: Option<String>,
}

/// Standard HTTP error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            status: "error".to_string(),
        }
    }

    fn into_value(self) -> serde_json::Value {
        serde_json::json!({ "error": self.error, "status": self.status })
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner process: 400 on blank text, otherwise always 200 (ingestion is best-effort).
pub async fn process_inner(services: &Services, req: ProcessRequest) -> (StatusCode, serde_json::Value) {
    let text = match req.text {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Text cannot be empty.").into_value(),
            );
        }
    };

    let response = crate::router::handle_request(MnemosRequest::Ingest { text }, services).await;
    into_http(response)
}

/// Inner graph: projection of the current store contents.
pub async fn graph_inner(services: &Services) -> (StatusCode, serde_json::Value) {
    let response = crate::router::handle_request(MnemosRequest::Graph, services).await;
    into_http(response)
}

/// Inner clear: destructive full reset.
pub async fn clear_inner(services: &Services) -> (StatusCode, serde_json::Value) {
    let response = crate::router::handle_request(MnemosRequest::Reset, services).await;
    into_http(response)
}

/// Inner ask: 400 on blank question; 200 `{answer}` for answered, empty-memory and
/// generation-failure outcomes alike. Only graph store failures yield 500.
pub async fn ask_inner(services: &Services, req: AskRequest) -> (StatusCode, serde_json::Value) {
    let question = match req.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Question cannot be empty.").into_value(),
            );
        }
    };

    let response = crate::router::handle_request(MnemosRequest::Ask { question }, services).await;
    into_http(response)
}

/// Inner health check: queries the graph store and returns (status_code, json_body).
pub async fn health_inner(services: &Services) -> (StatusCode, serde_json::Value) {
    match services.store.version().await {
        Ok(version) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "graph_store": version,
                "socket": services.config.service.socket_path,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": PROTOCOL,
    })
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn process_handler(
    State(state): State<Arc<Services>>,
    payload: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => process_inner(&state, req).await,
        Err(rejection) => rejection_to_http(rejection),
    };
    (status, Json(body))
}

pub async fn graph_handler(State(state): State<Arc<Services>>) -> impl IntoResponse {
    let (status, body) = graph_inner(&state).await;
    (status, Json(body))
}

pub async fn clear_handler(State(state): State<Arc<Services>>) -> impl IntoResponse {
    let (status, body) = clear_inner(&state).await;
    (status, Json(body))
}

pub async fn ask_handler(
    State(state): State<Arc<Services>>,
    payload: std::result::Result<Json<AskRequest>, JsonRejection>,
) -> impl IntoResponse {
    let (status, body) = match payload {
        Ok(Json(req)) => ask_inner(&state, req).await,
        Err(rejection) => rejection_to_http(rejection),
    };
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<Services>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Convert an IPC `MnemosResponse` into an HTTP body value, or an error string.
pub fn response_to_http(response: MnemosResponse) -> std::result::Result<serde_json::Value, String> {
    if response.is_ok() {
        Ok(response.data.unwrap_or(serde_json::json!({})))
    } else {
        Err(response.error.unwrap_or_else(|| "unknown error".to_string()))
    }
}

/// Malformed or non-JSON bodies get the same error shape as every other failure.
fn rejection_to_http(rejection: JsonRejection) -> (StatusCode, serde_json::Value) {
    tracing::warn!(error = %rejection.body_text(), "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        ErrorResponse::new(format!("Invalid request body: {}", rejection.body_text())).into_value(),
    )
}

fn into_http(response: MnemosResponse) -> (StatusCode, serde_json::Value) {
    match response_to_http(response) {
        Ok(data) => (StatusCode::OK, data),
        Err(e) => {
            tracing::error!(error = %e, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(e).into_value(),
            )
        }
    }
}

// ============================================================================
// Unit Tests: pure helpers. Endpoint behaviour lives in tests/http_integration.rs
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // TEST 1: version_inner is pure and returns correct fields
    // ========================================================================
    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["protocol"], "mnemos/1", "protocol must be mnemos/1");
    }

    // ========================================================================
    // TEST 2: response_to_http: ok response extracts data
    // ========================================================================
    #[test]
    fn test_response_to_http_ok() {
        let resp = MnemosResponse::ok(serde_json::json!({"nodes": [], "links": []}));
        let data = response_to_http(resp).unwrap();
        assert!(data["nodes"].is_array());
    }

    // ========================================================================
    // TEST 3: response_to_http: error response returns Err
    // ========================================================================
    #[test]
    fn test_response_to_http_error() {
        let resp = MnemosResponse::err("something went wrong");
        assert_eq!(response_to_http(resp).unwrap_err(), "something went wrong");
    }

    // ========================================================================
    // TEST 4: response_to_http: ok with no data returns empty object
    // ========================================================================
    #[test]
    fn test_response_to_http_ok_no_data() {
        let mut resp = MnemosResponse::ok(serde_json::json!({}));
        resp.data = None;
        assert!(response_to_http(resp).unwrap().is_object());
    }

    // ========================================================================
    // TEST 5: response_to_http: error with no message returns fallback
    // ========================================================================
    #[test]
    fn test_response_to_http_error_no_message() {
        let mut resp = MnemosResponse::err("x");
        resp.error = None;
        assert_eq!(response_to_http(resp).unwrap_err(), "unknown error");
    }

    // ========================================================================
    // TEST 6: into_http maps errors to 500 with the standard error body
    // ========================================================================
    #[test]
    fn test_into_http_error_status() {
        let (status, body) = into_http(MnemosResponse::err("store down"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "store down");
    }
}
