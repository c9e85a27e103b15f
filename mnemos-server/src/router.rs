use crate::services::Services;
use crate::subsystems::{ask, graph, ingest};
use mnemos_core::ipc::{MnemosRequest, MnemosResponse};

pub const INGEST_MESSAGE: &str = "Knowledge was added to the agent's memory network.";
pub const RESET_MESSAGE: &str = "The agent's memory has been completely reset.";

pub async fn handle_request(request: MnemosRequest, services: &Services) -> MnemosResponse {
    match request {
        MnemosRequest::Ping => MnemosResponse::pong(),
        MnemosRequest::Health => match services.store.version().await {
            Ok(version) => MnemosResponse::ok(serde_json::json!({
                "graph_store": version,
                "backend": services.store.name(),
                "status": "healthy"
            })),
            Err(e) => MnemosResponse::err(format!("Graph store health check failed: {}", e)),
        },
        MnemosRequest::Ingest { text } => {
            let text = text.trim();
            if text.is_empty() {
                return MnemosResponse::err("Text cannot be empty.");
            }
            let outcome =
                ingest::ingest_text(text, services.engine.as_ref(), &services.config.memory_engine)
                    .await;
            // Every outcome is reported as success; the label keeps the distinction.
            MnemosResponse::ok(serde_json::json!({
                "status": "success",
                "message": INGEST_MESSAGE,
                "outcome": outcome.label(),
                "episode_id": outcome.episode_id(),
            }))
        }
        MnemosRequest::Graph => match graph::snapshot(services.store.as_ref()).await {
            Ok(snapshot) => MnemosResponse::ok(serde_json::json!({
                "nodes": snapshot.nodes,
                "links": snapshot.links,
            })),
            Err(e) => MnemosResponse::err(e.to_string()),
        },
        MnemosRequest::Reset => match graph::reset(services.store.as_ref()).await {
            Ok(()) => MnemosResponse::ok(serde_json::json!({
                "status": "success",
                "message": RESET_MESSAGE,
            })),
            Err(e) => MnemosResponse::err(e.to_string()),
        },
        MnemosRequest::Ask { question } => {
            let result = ask::answer(
                &question,
                services.store.as_ref(),
                services.completion.as_ref(),
                services.config.completion.answer_language.as_deref(),
            )
            .await;

            match result {
                Ok(answer) => MnemosResponse::ok(serde_json::json!({
                    "answer": answer.message(),
                    "outcome": answer.outcome(),
                })),
                Err(e) => MnemosResponse::err(e.to_string()),
            }
        }
    }
}
