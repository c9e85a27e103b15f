//! Graph subsystem: visualization snapshot and full reset
//!
//! Both operations read or write the store directly on every call. Read failures
//! propagate: a broken visualization is directly actionable by the caller.

use mnemos_core::models::GraphSnapshot;
use mnemos_core::projection;
use mnemos_core::store::{GraphStore, StoreError};

/// Load every node (with its outgoing relationships) and project it for the viewer.
pub async fn snapshot(store: &dyn GraphStore) -> Result<GraphSnapshot, StoreError> {
    let records = store.node_records().await?;
    let snapshot = projection::project(&records);

    tracing::debug!(
        rows = records.len(),
        nodes = snapshot.nodes.len(),
        links = snapshot.links.len(),
        "Projected graph snapshot"
    );

    Ok(snapshot)
}

/// Permanently delete every node and relationship.
pub async fn reset(store: &dyn GraphStore) -> Result<(), StoreError> {
    store.reset().await?;
    tracing::info!(backend = store.name(), "Knowledge graph reset");
    Ok(())
}
