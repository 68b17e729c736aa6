//! Node type and socket layout
//!
//! A node owns a fixed sequence of sockets created from its type template:
//! indices `0..inputs` are inputs, `inputs..inputs+outputs` are outputs.
//! The sequence is never resized after construction. Each node also keeps
//! the set of edges currently incident to it, so per-node updates cost
//! O(degree) rather than O(total edges).

use std::collections::HashSet;

use glam::Vec2;
use uuid::Uuid;

use super::edge::EdgeId;
use super::socket::{Socket, SocketRole};
use crate::document::{parse_entity_id, NodeRecord};
use crate::error::GraphError;
use crate::templates::NodeTemplate;

/// Unique identifier for a node
pub type NodeId = Uuid;

/// A graph vertex with position, type tag and fixed input/output sockets
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    node_type: String,
    position: Vec2,
    sockets: Vec<Socket>,
    input_count: usize,
    incident_edges: HashSet<EdgeId>,
}

impl Node {
    /// Creates a node with `inputs` input sockets followed by `outputs`
    /// output sockets
    pub fn new(
        id: NodeId,
        node_type: impl Into<String>,
        position: Vec2,
        inputs: usize,
        outputs: usize,
    ) -> Self {
        let mut sockets = Vec::with_capacity(inputs + outputs);
        for index in 0..inputs {
            sockets.push(Socket::new(SocketRole::Input, index));
        }
        for index in inputs..inputs + outputs {
            sockets.push(Socket::new(SocketRole::Output, index));
        }
        Self {
            id,
            node_type: node_type.into(),
            position,
            sockets,
            input_count: inputs,
            incident_edges: HashSet::new(),
        }
    }

    /// Creates a node with the socket layout described by a type template
    pub fn from_template(id: NodeId, template: &NodeTemplate, position: Vec2) -> Self {
        Self::new(
            id,
            template.node_type.clone(),
            position,
            template.inputs,
            template.outputs,
        )
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    // ---- Socket access ----

    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.sockets.len() - self.input_count
    }

    /// Socket by node-global index
    pub fn socket(&self, index: usize) -> Option<&Socket> {
        self.sockets.get(index)
    }

    pub(crate) fn socket_mut(&mut self, index: usize) -> Option<&mut Socket> {
        self.sockets.get_mut(index)
    }

    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.sockets.iter()
    }

    /// True if `index` addresses an input socket
    pub fn is_input_index(&self, index: usize) -> bool {
        index < self.input_count
    }

    /// True if `index` addresses an output socket
    pub fn is_output_index(&self, index: usize) -> bool {
        index >= self.input_count && index < self.sockets.len()
    }

    // ---- Incident edge bookkeeping ----

    /// Number of edges currently connected to this node
    pub fn degree(&self) -> usize {
        self.incident_edges.len()
    }

    /// Ids of the edges currently connected to this node
    pub fn incident_edges(&self) -> impl Iterator<Item = &EdgeId> {
        self.incident_edges.iter()
    }

    pub(crate) fn register_edge(&mut self, edge: EdgeId) {
        self.incident_edges.insert(edge);
    }

    pub(crate) fn unregister_edge(&mut self, edge: EdgeId) {
        if !self.incident_edges.remove(&edge) {
            debug_assert!(false, "edge {} not incident to node {}", edge, self.id);
            log::error!("unregister of edge {} not incident to node {}", edge, self.id);
        }
    }
}

// Self-serialization: a node renders and parses its own document record
impl Node {
    /// Renders this node as a document record
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.id.to_string(),
            node_type: self.node_type.clone(),
            x: self.position.x,
            y: self.position.y,
            inputs: self.input_count(),
            outputs: self.output_count(),
        }
    }

    /// Builds a node from a document record and its resolved type template.
    /// The template's socket counts are authoritative; a disagreeing record
    /// is logged and overridden.
    pub fn from_record(record: &NodeRecord, template: &NodeTemplate) -> Result<Self, GraphError> {
        let id = parse_entity_id(&record.id)?;
        if record.inputs != template.inputs || record.outputs != template.outputs {
            log::warn!(
                "node {}: record sockets {}/{} disagree with template '{}' ({}/{}), template wins",
                id,
                record.inputs,
                record.outputs,
                template.node_type,
                template.inputs,
                template.outputs
            );
        }
        Ok(Self::from_template(
            id,
            template,
            Vec2::new(record.x, record.y),
        ))
    }
}
