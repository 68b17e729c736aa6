//! Single-pass document writing
//!
//! The writer walks the graph once and asks each entity for its own record;
//! it never branches on concrete node type. Entity order in the output is
//! not significant.

use std::path::Path;

use crate::constants;
use crate::error::GraphError;
use crate::graph::NodeGraph;

use super::{DocumentMetadata, GraphDocument};

/// Renders a graph as a document
pub fn document_from_graph(graph: &NodeGraph) -> GraphDocument {
    let now = chrono::Utc::now().to_rfc3339();
    GraphDocument {
        version: constants::document::FORMAT_VERSION.to_string(),
        metadata: Some(DocumentMetadata {
            created: now.clone(),
            modified: now,
            creator: constants::document::CREATOR.to_string(),
            description: "Node graph".to_string(),
        }),
        nodes: graph.nodes().map(|node| node.to_record()).collect(),
        connections: graph.edges().map(|edge| edge.to_record()).collect(),
    }
}

/// Serializes a graph and writes it to `path`
pub fn save_graph(graph: &NodeGraph, path: &Path) -> Result<(), GraphError> {
    let doc = document_from_graph(graph);
    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, json)?;
    log::debug!(
        "graph saved to {}: {} nodes, {} edges",
        path.display(),
        doc.nodes.len(),
        doc.connections.len()
    );
    Ok(())
}
