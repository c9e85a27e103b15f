//! Graph projection for the 3D viewer
//!
//! Turns raw store rows into the `{nodes, links}` payload:
//! - Nodes are deduplicated by store element id, never by display name
//! - Display name = `name` property, else the primary label
//! - A row without a target still surfaces its source node (isolated nodes)
//! - Parallel edges are kept; each may be a distinct timestamped fact

use crate::models::{GraphEdge, GraphNode, GraphSnapshot, NodeRecord};
use std::collections::HashSet;

/// Display name used when a node has neither a `name` nor a label.
pub const UNLABELED: &str = "Unlabeled";

/// Resolve the human-facing name of a node: a non-empty name wins, then the
/// primary type label. Shared by the projector and the context serializer.
pub fn resolve_display_name(name: Option<&str>, label: Option<&str>) -> String {
    match (name, label) {
        (Some(n), _) if !n.is_empty() => n.to_string(),
        (_, Some(l)) if !l.is_empty() => l.to_string(),
        _ => UNLABELED.to_string(),
    }
}

/// Project raw node records into a visualization snapshot.
///
/// # Arguments
/// * `records` - Rows of the left-joined node/relationship query, in store order
///
/// # Returns
/// * `GraphSnapshot` - One node per distinct id (first-seen order) and one link per
///   row whose source and target ids are both present
pub fn project(records: &[NodeRecord]) -> GraphSnapshot {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut links: Vec<GraphEdge> = Vec::new();

    for record in records {
        if let Some(source_id) = record.source_id.as_deref() {
            upsert_node(
                &mut seen,
                &mut nodes,
                source_id,
                record.source_name.as_deref(),
                record.source_label.as_deref(),
            );
        }

        let Some(target_id) = record.target_id.as_deref() else {
            continue;
        };

        upsert_node(
            &mut seen,
            &mut nodes,
            target_id,
            record.target_name.as_deref(),
            record.target_label.as_deref(),
        );

        // Both endpoints must be resolved before a link is emitted.
        if let Some(source_id) = record.source_id.as_deref() {
            links.push(GraphEdge {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                relation_name: record.relation.clone().unwrap_or_default(),
            });
        }
    }

    GraphSnapshot { nodes, links }
}

fn upsert_node<'a>(
    seen: &mut HashSet<&'a str>,
    nodes: &mut Vec<GraphNode>,
    id: &'a str,
    name: Option<&str>,
    label: Option<&str>,
) {
    if !seen.insert(id) {
        return;
    }
    nodes.push(GraphNode {
        id: id.to_string(),
        display_name: resolve_display_name(name, label),
    });
}

// ============================================================================
// TESTS
// ============================================================================
