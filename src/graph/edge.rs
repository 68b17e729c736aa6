//! Edge type - a directed connection between two sockets
//!
//! An edge stores its endpoints as node ids plus node-global socket indices.
//! Edges built from a document start *declared*: the endpoint data is
//! recorded but nothing is bound, because the referenced nodes may appear
//! later in the document. Resolution validates the endpoints and registers
//! the edge with both sockets and both incident sets; interactive connects
//! produce resolved edges directly.

use uuid::Uuid;

use super::node::NodeId;
use crate::document::{parse_entity_id, EdgeRecord};
use crate::error::GraphError;

/// Unique identifier for an edge
pub type EdgeId = Uuid;

/// A directed link from an output socket to an input socket
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    from_node: NodeId,
    from_socket: usize,
    to_node: NodeId,
    to_socket: usize,
    resolved: bool,
}

impl Edge {
    /// Creates a declared edge: endpoint references only, nothing bound yet
    pub fn declared(
        id: EdgeId,
        from_node: NodeId,
        from_socket: usize,
        to_node: NodeId,
        to_socket: usize,
    ) -> Self {
        Self {
            id,
            from_node,
            from_socket,
            to_node,
            to_socket,
            resolved: false,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from_node(&self) -> NodeId {
        self.from_node
    }

    pub fn from_socket(&self) -> usize {
        self.from_socket
    }

    pub fn to_node(&self) -> NodeId {
        self.to_node
    }

    pub fn to_socket(&self) -> usize {
        self.to_socket
    }

    /// True once the endpoints are bound into live sockets and incident sets
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }

    /// True if either endpoint names the given node
    pub fn touches(&self, node: NodeId) -> bool {
        self.from_node == node || self.to_node == node
    }
}

// Self-serialization: an edge renders and parses its own document record
impl Edge {
    /// Renders this edge as a document record
    pub fn to_record(&self) -> EdgeRecord {
        EdgeRecord {
            id: self.id.to_string(),
            from_node: self.from_node.to_string(),
            from_socket: self.from_socket,
            to_node: self.to_node.to_string(),
            to_socket: self.to_socket,
        }
    }

    /// Builds a declared edge from a document record. Endpoint existence is
    /// deliberately not checked here; that is the resolution phase's job.
    pub fn from_record(record: &EdgeRecord) -> Result<Self, GraphError> {
        Ok(Self::declared(
            parse_entity_id(&record.id)?,
            parse_entity_id(&record.from_node)?,
            record.from_socket,
            parse_entity_id(&record.to_node)?,
            record.to_socket,
        ))
    }
}
