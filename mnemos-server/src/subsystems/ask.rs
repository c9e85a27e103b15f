//! Ask subsystem: graph RAG question answering
//!
//! This subsystem implements `MnemosRequest::Ask`:
//! - Rejects blank questions before touching any collaborator
//! - Loads every edge triplet from the graph store (retrieval completes first)
//! - Short-circuits to `EmptyMemory` when the graph has no edges
//! - Builds one grounding prompt and sends it to the completion backend
//! - Converts generation failures into a degraded, user-visible answer
//!
//! The "answer only from these facts" rule lives in the prompt text. Nothing here can
//! check that the model obeyed it; the only guarantee is that the prompt carries the
//! full current context and the literal question.

use mnemos_core::completion::{CompletionBackend, NO_ANSWER_PRODUCED};
use mnemos_core::context::{self, GroundingContext};
use mnemos_core::store::{GraphStore, StoreError};
use thiserror::Error;

pub const EMPTY_MEMORY_MESSAGE: &str =
    "The agent's memory is currently empty. Inject some knowledge into the network first.";

const GENERATION_FAILED_PREFIX: &str = "Error communicating with the language model";

const GROUNDING_INSTRUCTIONS: &str = "\
You are a knowledge graph expert and an autonomous reasoning agent.
Below are the entity relationships (triplets) stored in your memory.
Answer the user's question by reasoning step by step using ONLY the relationships in this graph.
Do not invent any information that is not present in the graph.";

/// Terminal states of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerResult {
    Answered(String),
    EmptyMemory,
    GenerationFailed(String),
}

impl AnswerResult {
    /// Text shown to the user for every outcome, degraded ones included.
    pub fn message(&self) -> String {
        match self {
            AnswerResult::Answered(text) => text.clone(),
            AnswerResult::EmptyMemory => EMPTY_MEMORY_MESSAGE.to_string(),
            AnswerResult::GenerationFailed(reason) => {
                format!("{}: {}", GENERATION_FAILED_PREFIX, reason)
            }
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            AnswerResult::Answered(_) => "answered",
            AnswerResult::EmptyMemory => "empty_memory",
            AnswerResult::GenerationFailed(_) => "generation_failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum AskError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Failed to read the knowledge graph: {0}")]
    Store(#[from] StoreError),
}

/// Build the grounding prompt.
///
/// # Arguments
/// * `context` - Non-empty grounding context, embedded line by line
/// * `question` - Literal user question
/// * `answer_language` - Optional language the model is asked to answer in
pub fn build_prompt(context: &GroundingContext, question: &str, answer_language: Option<&str>) -> String {
    let mut prompt = String::from(GROUNDING_INSTRUCTIONS);
    if let Some(language) = answer_language.filter(|l| !l.trim().is_empty()) {
        prompt.push_str(&format!("\nWrite your answer in {}.", language.trim()));
    }
    prompt.push_str("\n\nMemory network (knowledge graph):\n");
    prompt.push_str(&context.render());
    prompt.push_str(&format!("\n\nUser question: {}\nAnswer:", question));
    prompt
}

/// Answer a question from the current graph.
///
/// # Returns
/// * `Ok(AnswerResult)` - Answered, EmptyMemory or GenerationFailed
/// * `Err(AskError::EmptyQuestion)` - Blank question, no collaborator was called
/// * `Err(AskError::Store)` - The graph could not be read
pub async fn answer(
    question: &str,
    store: &dyn GraphStore,
    completion: &dyn CompletionBackend,
    answer_language: Option<&str>,
) -> Result<AnswerResult, AskError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AskError::EmptyQuestion);
    }

    let records = store.triplet_records().await?;
    let grounding = context::serialize(&records);

    if grounding.is_empty() {
        tracing::info!("Graph has no edges, skipping generation");
        return Ok(AnswerResult::EmptyMemory);
    }

    let prompt = build_prompt(&grounding, question, answer_language);
    let model = completion.default_model();

    tracing::info!(
        triplets = grounding.len(),
        backend = completion.name(),
        model = %model,
        "Sending grounded prompt"
    );

    match completion.complete(&prompt, model).await {
        Ok(text) if text.trim().is_empty() => Ok(AnswerResult::Answered(NO_ANSWER_PRODUCED.to_string())),
        Ok(text) => Ok(AnswerResult::Answered(text)),
        Err(e) => {
            tracing::warn!(error = %e, "Generation failed, returning degraded answer");
            Ok(AnswerResult::GenerationFailed(e.to_string()))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
