//! Phased document loading
//!
//! Loading is transactional: all three phases run against a scratch graph,
//! and only a fully resolved scratch graph is handed back to the caller.
//! Any failure drops the scratch, so the caller's live graph is never
//! touched by a bad document.
//!
//! Edges may be declared before the nodes they reference appear in the
//! document, so endpoint checks are deferred to the resolution phase.

use std::path::Path;

use crate::constants;
use crate::error::GraphError;
use crate::graph::{Edge, EdgeId, Node, NodeGraph};
use crate::templates::TemplateRegistry;

use super::GraphDocument;

/// Builds a graph from a parsed document.
///
/// Phase 1 materializes nodes (unknown node types abort the load), phase 2
/// materializes declared edges, phase 3 resolves every edge against the
/// scratch graph. The first validation failure aborts the whole load.
pub fn graph_from_document(
    doc: &GraphDocument,
    templates: &TemplateRegistry,
) -> Result<NodeGraph, GraphError> {
    if doc.version != constants::document::FORMAT_VERSION {
        log::warn!(
            "document version '{}' differs from '{}', loading anyway",
            doc.version,
            constants::document::FORMAT_VERSION
        );
    }

    let mut graph = NodeGraph::new();

    // Phase 1: nodes, socket counts resolved through the template provider
    for record in &doc.nodes {
        let template = templates
            .get(&record.node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(record.node_type.clone()))?;
        let node = Node::from_record(record, template)?;
        graph.add_node(node)?;
    }

    // Phase 2: declared edges; forward references are legal here
    for record in &doc.connections {
        let edge = Edge::from_record(record)?;
        graph.add_declared_edge(edge)?;
    }

    // Phase 3: resolve every edge now that all nodes exist
    let edge_ids: Vec<EdgeId> = graph.edge_ids().copied().collect();
    for edge_id in edge_ids {
        graph.resolve_edge(&edge_id)?;
    }

    debug_assert!(graph.validate().is_ok());
    log::debug!(
        "document loaded: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Reads and parses a document file, then builds a graph from it
pub fn load_graph(path: &Path, templates: &TemplateRegistry) -> Result<NodeGraph, GraphError> {
    let content = std::fs::read_to_string(path)?;
    let doc: GraphDocument = serde_json::from_str(&content)?;
    graph_from_document(&doc, templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{EdgeRecord, NodeRecord};
    use uuid::Uuid;

    fn node_record(id: Uuid, node_type: &str, inputs: usize, outputs: usize) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            node_type: node_type.to_string(),
            x: 0.0,
            y: 0.0,
            inputs,
            outputs,
        }
    }

    fn edge_record(from: Uuid, from_socket: usize, to: Uuid, to_socket: usize) -> EdgeRecord {
        EdgeRecord {
            id: Uuid::new_v4().to_string(),
            from_node: from.to_string(),
            from_socket,
            to_node: to.to_string(),
            to_socket,
        }
    }

    fn empty_doc() -> GraphDocument {
        GraphDocument {
            version: "1.0".to_string(),
            metadata: None,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    #[test]
    fn loads_nodes_and_edges() {
        let source = Uuid::new_v4();
        let sink = Uuid::new_v4();
        let mut doc = empty_doc();
        doc.nodes.push(node_record(source, "SOURCE", 0, 1));
        doc.nodes.push(node_record(sink, "SINK", 1, 0));
        doc.connections.push(edge_record(source, 0, sink, 0));

        let graph = graph_from_document(&doc, &TemplateRegistry::with_builtins()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|edge| edge.is_resolved()));
        graph.validate().unwrap();
    }

    #[test]
    fn edges_declared_before_their_nodes_resolve() {
        // Connection listed first, nodes after: forward references are legal
        let source = Uuid::new_v4();
        let sink = Uuid::new_v4();
        let mut doc = empty_doc();
        doc.connections.push(edge_record(source, 0, sink, 0));
        doc.nodes.push(node_record(sink, "SINK", 1, 0));
        doc.nodes.push(node_record(source, "SOURCE", 0, 1));

        let graph = graph_from_document(&doc, &TemplateRegistry::with_builtins()).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edges().all(|edge| edge.is_resolved()));
    }

    #[test]
    fn unknown_node_type_aborts() {
        let mut doc = empty_doc();
        doc.nodes.push(node_record(Uuid::new_v4(), "WIDGET", 1, 1));

        let result = graph_from_document(&doc, &TemplateRegistry::with_builtins());
        assert!(matches!(result, Err(GraphError::UnknownNodeType(t)) if t == "WIDGET"));
    }

    #[test]
    fn dangling_edge_endpoint_aborts() {
        let source = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let mut doc = empty_doc();
        doc.nodes.push(node_record(source, "SOURCE", 0, 1));
        doc.connections.push(edge_record(source, 0, missing, 0));

        let result = graph_from_document(&doc, &TemplateRegistry::with_builtins());
        assert!(matches!(
            result,
            Err(GraphError::DanglingEndpoint { node, .. }) if node == missing
        ));
    }

    #[test]
    fn out_of_range_socket_aborts() {
        let source = Uuid::new_v4();
        let sink = Uuid::new_v4();
        let mut doc = empty_doc();
        doc.nodes.push(node_record(source, "SOURCE", 0, 1));
        doc.nodes.push(node_record(sink, "SINK", 1, 0));
        doc.connections.push(edge_record(source, 9, sink, 0));

        let result = graph_from_document(&doc, &TemplateRegistry::with_builtins());
        assert!(matches!(
            result,
            Err(GraphError::SocketOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn duplicate_node_id_aborts() {
        let id = Uuid::new_v4();
        let mut doc = empty_doc();
        doc.nodes.push(node_record(id, "SOURCE", 0, 1));
        doc.nodes.push(node_record(id, "SINK", 1, 0));

        let result = graph_from_document(&doc, &TemplateRegistry::with_builtins());
        assert!(matches!(result, Err(GraphError::DuplicateId(dup)) if dup == id));
    }

    #[test]
    fn braced_uppercase_ids_normalize() {
        let source = Uuid::new_v4();
        let sink = Uuid::new_v4();
        let mut doc = empty_doc();
        let mut source_record = node_record(source, "SOURCE", 0, 1);
        source_record.id = format!("{{{}}}", source.to_string().to_uppercase());
        doc.nodes.push(source_record);
        doc.nodes.push(node_record(sink, "SINK", 1, 0));
        let mut connection = edge_record(source, 0, sink, 0);
        connection.from_node = format!("{{{}}}", source);
        doc.connections.push(connection);

        let graph = graph_from_document(&doc, &TemplateRegistry::with_builtins()).unwrap();
        assert!(graph.has_node(&source));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn record_counts_defer_to_template() {
        let id = Uuid::new_v4();
        let mut doc = empty_doc();
        // Record claims 5 inputs; the SOURCE template says 0/1
        doc.nodes.push(node_record(id, "SOURCE", 5, 5));

        let graph = graph_from_document(&doc, &TemplateRegistry::with_builtins()).unwrap();
        let node = graph.node(&id).unwrap();
        assert_eq!(node.input_count(), 0);
        assert_eq!(node.output_count(), 1);
    }
}
