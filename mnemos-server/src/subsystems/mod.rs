pub mod ask;
pub mod graph;
pub mod ingest;
