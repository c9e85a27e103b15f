use serde::{Deserialize, Serialize};

/// A node in the visualization payload. `id` is the store's element id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

/// A directed relationship between two projected nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(rename = "source")]
    pub source_id: String,
    #[serde(rename = "target")]
    pub target_id: String,
    #[serde(rename = "name")]
    pub relation_name: String,
}

/// The `{nodes, links}` payload consumed by the graph viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

/// One row of the "every node, optionally joined to one outgoing relationship" query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub source_id: Option<String>,
    pub source_name: Option<String>,
    pub source_label: Option<String>,
    pub target_id: Option<String>,
    pub target_name: Option<String>,
    pub target_label: Option<String>,
    pub relation: Option<String>,
}

/// One row of the "every directed edge" query; both endpoints are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripletRecord {
    pub source_name: Option<String>,
    pub source_label: Option<String>,
    pub relation: String,
    pub target_name: Option<String>,
    pub target_label: Option<String>,
}
