pub mod episode;
pub mod graph;

pub use episode::Episode;
pub use graph::{GraphEdge, GraphNode, GraphSnapshot, NodeRecord, TripletRecord};
