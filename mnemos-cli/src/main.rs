//! mnemos-cli: command-line client for the Mnemos HTTP API
//!
//! # Subcommands
//! - `ingest <text>`             submit text to the memory engine
//! - `ask <question> [--json]`   graph-grounded question answering
//! - `graph [--json]`            node/edge summary of the knowledge graph
//! - `reset --yes`               delete every node and relationship
//! - `status`                    show server health

use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Ingestion waits for entity extraction, which can take minutes on local models.
const LONG_TIMEOUT_SECS: u64 = 300;
const SHORT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "mnemos-cli",
    version,
    about = "Mnemos knowledge-graph memory client"
)]
struct Cli {
    /// Mnemos HTTP server URL (overrides MNEMOS_HTTP_URL env var)
    #[arg(long, env = "MNEMOS_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add text to the agent's memory
    Ingest {
        /// Free-form text to remember
        text: String,
    },

    /// Ask a question answered from the knowledge graph
    Ask {
        question: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Summarize the current knowledge graph
    Graph {
        /// Print the raw `{nodes, links}` payload
        #[arg(long)]
        json: bool,
    },

    /// Permanently delete the whole knowledge graph
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show Mnemos server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkView {
    pub source: String,
    pub target: String,
    pub name: String,
}

/// Payload of GET /api/graph
#[derive(Debug, Deserialize, Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
}

/// Payload of POST /api/ask
#[derive(Debug, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub outcome: Option<String>,
}

// ============================================================================
// Formatting
// ============================================================================

/// Counts for the `graph` subcommand.
#[derive(Debug, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub links: usize,
    /// Edge count per relation name, sorted by name.
    pub relations: BTreeMap<String, usize>,
}

pub fn summarize(graph: &GraphResponse) -> GraphSummary {
    let mut relations = BTreeMap::new();
    for link in &graph.links {
        *relations.entry(link.name.clone()).or_insert(0) += 1;
    }
    GraphSummary {
        nodes: graph.nodes.len(),
        links: graph.links.len(),
        relations,
    }
}

/// One `source -[RELATION]-> target` line per link, using node display names.
/// Ids with no matching node are printed as-is.
pub fn edge_lines(graph: &GraphResponse) -> Vec<String> {
    let names: HashMap<&str, &str> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.name.as_str()))
        .collect();
    let name_of = |id: &str| names.get(id).copied().unwrap_or(id).to_string();

    graph
        .links
        .iter()
        .map(|l| format!("{} -[{}]-> {}", name_of(&l.source), l.name, name_of(&l.target)))
        .collect()
}

pub fn format_summary(summary: &GraphSummary) -> String {
    let mut out = format!("Nodes: {}\nLinks: {}", summary.nodes, summary.links);
    for (relation, count) in &summary.relations {
        let relation = if relation.is_empty() { "(unnamed)" } else { relation };
        out.push_str(&format!("\n  {:<24} {}", relation, count));
    }
    out
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn client(timeout_secs: u64) -> anyhow::Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()?)
}

/// Fail with the server's `error` field when the status is not 2xx.
fn check(resp: reqwest::blocking::Response) -> anyhow::Result<serde_json::Value> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().unwrap_or_default();
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("no error message");
        bail!("server returned {}: {}", status, message);
    }
    Ok(body)
}

fn do_ingest(server: &str, text: &str) -> anyhow::Result<()> {
    let url = format!("{}/api/process", server);
    let resp = client(LONG_TIMEOUT_SECS)?
        .post(&url)
        .json(&serde_json::json!({ "text": text }))
        .send()
        .with_context(|| format!("connection failed to {}", url))?;
    let body = check(resp)?;

    println!("{}", body["message"].as_str().unwrap_or("Submitted."));
    if body["outcome"] == "failed" {
        eprintln!("mnemos-cli: the memory engine did not accept the text; see server logs");
    }
    Ok(())
}

fn do_ask(server: &str, question: &str, json_output: bool) -> anyhow::Result<()> {
    let url = format!("{}/api/ask", server);
    let resp = client(LONG_TIMEOUT_SECS)?
        .post(&url)
        .json(&serde_json::json!({ "question": question }))
        .send()
        .with_context(|| format!("connection failed to {}", url))?;
    let body = check(resp)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let answer: AskResponse =
        serde_json::from_value(body).context("failed to parse ask response")?;
    if answer.outcome.as_deref() == Some("generation_failed") {
        bail!("{}", answer.answer);
    }
    println!("{}", answer.answer);
    Ok(())
}

fn do_graph(server: &str, json_output: bool) -> anyhow::Result<()> {
    let url = format!("{}/api/graph", server);
    let resp = client(SHORT_TIMEOUT_SECS)?
        .get(&url)
        .send()
        .with_context(|| format!("connection failed to {}", url))?;
    let body = check(resp)?;
    let graph: GraphResponse =
        serde_json::from_value(body).context("failed to parse graph response")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("{}", format_summary(&summarize(&graph)));
    for line in edge_lines(&graph) {
        println!("{}", line);
    }
    Ok(())
}

fn do_reset(server: &str, confirmed: bool) -> anyhow::Result<()> {
    if !confirmed {
        bail!("reset deletes the entire knowledge graph; rerun with --yes to confirm");
    }

    let url = format!("{}/api/clear", server);
    let resp = client(SHORT_TIMEOUT_SECS)?
        .post(&url)
        .send()
        .with_context(|| format!("connection failed to {}", url))?;
    let body = check(resp)?;

    println!("{}", body["message"].as_str().unwrap_or("Reset."));
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let url = format!("{}/health", server);
    let resp = client(SHORT_TIMEOUT_SECS)?.get(&url).send();

    match resp {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Mnemos server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Graph store:   {}", body["graph_store"].as_str().unwrap_or("?"));
            println!("Socket:        {}", body["socket"].as_str().unwrap_or("?"));
        }
        Ok(r) => {
            let status = r.status();
            eprintln!("mnemos-cli: server unhealthy (HTTP {})", status);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("mnemos-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Ingest { text } => do_ingest(&server, &text),
        Commands::Ask { question, json } => do_ask(&server, &question, json),
        Commands::Graph { json } => do_graph(&server, json),
        Commands::Reset { yes } => do_reset(&server, yes),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("mnemos-cli: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str) -> NodeView {
        NodeView {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn link(source: &str, target: &str, name: &str) -> LinkView {
        LinkView {
            source: source.to_string(),
            target: target.to_string(),
            name: name.to_string(),
        }
    }

    fn sample() -> GraphResponse {
        GraphResponse {
            nodes: vec![node("1", "Alice"), node("2", "Bob"), node("3", "Acme")],
            links: vec![
                link("1", "2", "KNOWS"),
                link("1", "3", "WORKS_AT"),
                link("2", "3", "WORKS_AT"),
            ],
        }
    }

    // ========================================================================
    // TEST 1: summary counts nodes, links and relation names
    // ========================================================================
    #[test]
    fn test_summarize_counts() {
        let summary = summarize(&sample());

        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.links, 3);
        assert_eq!(summary.relations["WORKS_AT"], 2);
        assert_eq!(summary.relations["KNOWS"], 1);
    }

    // ========================================================================
    // TEST 2: edge lines use display names
    // ========================================================================
    #[test]
    fn test_edge_lines_resolve_names() {
        let lines = edge_lines(&sample());
        assert_eq!(lines[0], "Alice -[KNOWS]-> Bob");
        assert_eq!(lines[2], "Bob -[WORKS_AT]-> Acme");
    }

    // ========================================================================
    // TEST 3: unknown ids fall back to the raw id
    // ========================================================================
    #[test]
    fn test_edge_lines_unknown_id() {
        let graph = GraphResponse {
            nodes: vec![node("1", "Alice")],
            links: vec![link("1", "9", "KNOWS")],
        };
        assert_eq!(edge_lines(&graph), vec!["Alice -[KNOWS]-> 9".to_string()]);
    }

    // ========================================================================
    // TEST 4: empty graph formats without relation rows
    // ========================================================================
    #[test]
    fn test_format_empty_summary() {
        let graph = GraphResponse {
            nodes: vec![],
            links: vec![],
        };
        assert_eq!(format_summary(&summarize(&graph)), "Nodes: 0\nLinks: 0");
    }

    // ========================================================================
    // TEST 5: empty relation names get a placeholder, relations sorted
    // ========================================================================
    #[test]
    fn test_format_summary_relations() {
        let graph = GraphResponse {
            nodes: vec![node("1", "Alice"), node("2", "Bob")],
            links: vec![link("1", "2", "KNOWS"), link("2", "1", "")],
        };
        let text = format_summary(&summarize(&graph));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("(unnamed)"));
        assert!(lines[3].trim_start().starts_with("KNOWS"));
    }

    // ========================================================================
    // TEST 6: graph payload from the server deserializes
    // ========================================================================
    #[test]
    fn test_graph_response_parses_server_payload() {
        let body = serde_json::json!({
            "nodes": [{"id": "4:a:1", "name": "Alice"}],
            "links": [{"source": "4:a:1", "target": "4:a:1", "name": "SELF"}]
        });
        let graph: GraphResponse = serde_json::from_value(body).unwrap();
        assert_eq!(graph.nodes[0].name, "Alice");
        assert_eq!(graph.links[0].name, "SELF");
    }

    // ========================================================================
    // TEST 7: ask payload tolerates a missing outcome field
    // ========================================================================
    #[test]
    fn test_ask_response_without_outcome() {
        let answer: AskResponse =
            serde_json::from_value(serde_json::json!({"answer": "Acme."})).unwrap();
        assert_eq!(answer.answer, "Acme.");
        assert!(answer.outcome.is_none());
    }

    // ========================================================================
    // TEST 8: reset refuses without confirmation before any network call
    // ========================================================================
    #[test]
    fn test_reset_requires_confirmation() {
        let err = do_reset("http://127.0.0.1:9", false).unwrap_err();
        assert!(err.to_string().contains("--yes"));
    }
}
