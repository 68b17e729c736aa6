//! Owning graph registry and adjacency bookkeeping
//!
//! `NodeGraph` holds the id-keyed node and edge collections and mediates
//! every structural mutation: insertion, connection validation, resolution
//! of declared edges, cascading delete. It publishes nothing; the facade
//! layers change notification on top.

use std::collections::HashMap;

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use super::socket::SocketRole;
use crate::error::GraphError;

/// Aggregate counts over a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub socket_count: usize,
    pub connected_sockets: usize,
}

impl GraphStats {
    /// Sockets with no connection
    pub fn unconnected_sockets(&self) -> usize {
        self.socket_count - self.connected_sockets
    }
}

/// The owning collection of nodes and edges.
///
/// Invariants maintained across all mutations:
/// - ids are unique within each collection;
/// - a resolved edge's endpoints always name nodes and sockets currently
///   present in the graph;
/// - each node's incident-edge set is exactly the set of resolved edges
///   naming that node.
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
}

impl NodeGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Lookup ----

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = &EdgeId> {
        self.edges.keys()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Ids of the edges connected to a node. Costs O(degree), never a scan
    /// of the full edge collection.
    pub fn edges_of(&self, id: &NodeId) -> Result<Vec<EdgeId>, GraphError> {
        let node = self.nodes.get(id).ok_or(GraphError::NodeNotFound(*id))?;
        Ok(node.incident_edges().copied().collect())
    }

    /// Aggregate counts for status displays and scripting
    pub fn stats(&self) -> GraphStats {
        let socket_count = self.nodes.values().map(Node::socket_count).sum();
        let connected_sockets = self
            .nodes
            .values()
            .flat_map(Node::sockets)
            .filter(|socket| socket.is_connected())
            .count();
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            socket_count,
            connected_sockets,
        }
    }

    // ---- Insertion ----

    /// Inserts a node. Fails with `DuplicateId` if the id is taken; no other
    /// side effects.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Inserts a declared (unresolved) edge. Missing endpoints are not an
    /// error here: documents may reference nodes that appear later, and
    /// resolution is a separate phase.
    pub fn add_declared_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        let id = edge.id();
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.edges.insert(id, edge);
        Ok(id)
    }

    // ---- Connection ----

    /// Creates a resolved edge between an output socket and an input socket.
    /// On any validation failure nothing changes.
    pub fn connect(
        &mut self,
        id: EdgeId,
        from_node: NodeId,
        from_socket: usize,
        to_node: NodeId,
        to_socket: usize,
    ) -> Result<EdgeId, GraphError> {
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        if !self.nodes.contains_key(&from_node) {
            return Err(GraphError::NodeNotFound(from_node));
        }
        if !self.nodes.contains_key(&to_node) {
            return Err(GraphError::NodeNotFound(to_node));
        }
        self.check_connection(from_node, from_socket, to_node, to_socket)?;

        self.edges.insert(
            id,
            Edge::declared(id, from_node, from_socket, to_node, to_socket),
        );
        self.bind_edge(id);
        Ok(id)
    }

    /// Binds a declared edge into live sockets and incident sets (load
    /// phase 3). Validation failures leave the graph unchanged; the edge
    /// stays declared.
    pub fn resolve_edge(&mut self, id: &EdgeId) -> Result<(), GraphError> {
        let edge = self.edges.get(id).ok_or(GraphError::EdgeNotFound(*id))?;
        if edge.is_resolved() {
            return Ok(());
        }
        let (from_node, from_socket) = (edge.from_node(), edge.from_socket());
        let (to_node, to_socket) = (edge.to_node(), edge.to_socket());

        if !self.nodes.contains_key(&from_node) {
            return Err(GraphError::DanglingEndpoint {
                edge: *id,
                node: from_node,
            });
        }
        if !self.nodes.contains_key(&to_node) {
            return Err(GraphError::DanglingEndpoint {
                edge: *id,
                node: to_node,
            });
        }
        self.check_connection(from_node, from_socket, to_node, to_socket)?;
        self.bind_edge(*id);
        Ok(())
    }

    /// Validates one prospective connection against the rules shared by
    /// interactive connects and load-time resolution. Endpoint nodes must
    /// already be known to exist.
    fn check_connection(
        &self,
        from_node: NodeId,
        from_socket: usize,
        to_node: NodeId,
        to_socket: usize,
    ) -> Result<(), GraphError> {
        if from_node == to_node {
            return Err(GraphError::SelfConnection(from_node));
        }
        let from = &self.nodes[&from_node];
        let to = &self.nodes[&to_node];

        let source = from
            .socket(from_socket)
            .ok_or(GraphError::SocketOutOfRange {
                node: from_node,
                index: from_socket,
                count: from.socket_count(),
            })?;
        if !source.is_output() {
            return Err(GraphError::RoleMismatch {
                node: from_node,
                index: from_socket,
                expected: SocketRole::Output,
            });
        }
        let target = to.socket(to_socket).ok_or(GraphError::SocketOutOfRange {
            node: to_node,
            index: to_socket,
            count: to.socket_count(),
        })?;
        if !target.is_input() {
            return Err(GraphError::RoleMismatch {
                node: to_node,
                index: to_socket,
                expected: SocketRole::Input,
            });
        }
        if source.is_connected() {
            return Err(GraphError::SocketOccupied {
                node: from_node,
                index: from_socket,
            });
        }
        if target.is_connected() {
            return Err(GraphError::SocketOccupied {
                node: to_node,
                index: to_socket,
            });
        }
        Ok(())
    }

    /// Occupies both endpoint sockets and registers the edge in both
    /// incident sets, atomically with marking it resolved. The edge and both
    /// nodes must exist and the connection must have been validated.
    fn bind_edge(&mut self, id: EdgeId) {
        let edge = &self.edges[&id];
        let (from_node, from_socket) = (edge.from_node(), edge.from_socket());
        let (to_node, to_socket) = (edge.to_node(), edge.to_socket());

        let from = self.nodes.get_mut(&from_node).expect("endpoint validated");
        from.socket_mut(from_socket).expect("socket validated").attach(id);
        from.register_edge(id);

        let to = self.nodes.get_mut(&to_node).expect("endpoint validated");
        to.socket_mut(to_socket).expect("socket validated").attach(id);
        to.register_edge(id);

        self.edges.get_mut(&id).expect("edge present").mark_resolved();
    }

    // ---- Removal ----

    /// Removes an edge, releasing both endpoint sockets and incident-set
    /// entries first.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge, GraphError> {
        let edge = self.edges.remove(id).ok_or(GraphError::EdgeNotFound(*id))?;
        if edge.is_resolved() {
            self.release_endpoint(edge.from_node(), edge.from_socket(), *id);
            self.release_endpoint(edge.to_node(), edge.to_socket(), *id);
        }
        Ok(edge)
    }

    fn release_endpoint(&mut self, node_id: NodeId, socket: usize, edge: EdgeId) {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                if let Some(socket) = node.socket_mut(socket) {
                    socket.detach(edge);
                }
                node.unregister_edge(edge);
            }
            None => {
                // A resolved edge outliving its node is an invariant breach
                debug_assert!(false, "resolved edge {} outlived node {}", edge, node_id);
                log::error!("resolved edge {} references missing node {}", edge, node_id);
            }
        }
    }

    /// Removes a node and, first, every edge incident to it. Returns the
    /// node and the removed edge ids in removal order, so callers can
    /// notify edge removals before the node removal.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(Node, Vec<EdgeId>), GraphError> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NodeNotFound(*id));
        }
        // Snapshot: the incident set shrinks while edges are removed
        let incident: Vec<EdgeId> = self.nodes[id].incident_edges().copied().collect();
        for edge_id in &incident {
            if let Err(err) = self.remove_edge(edge_id) {
                debug_assert!(false, "incident edge {} vanished: {}", edge_id, err);
                log::error!("incident edge {} missing during cascade: {}", edge_id, err);
            }
        }
        let node = self.nodes.remove(id).expect("presence checked");
        Ok((node, incident))
    }

    /// Removes everything. The caller is responsible for publishing a single
    /// graph-cleared notification in place of per-item events.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.nodes.clear();
    }

    // ---- Consistency audit ----

    /// Verifies every cross-referencing invariant. Costs O(graph); meant
    /// for tests and debug builds, not per-operation use.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (id, node) in &self.nodes {
            if node.id() != *id {
                return Err(GraphError::Inconsistency(format!(
                    "node {} keyed under {}",
                    node.id(),
                    id
                )));
            }
        }
        for (id, edge) in &self.edges {
            if edge.id() != *id {
                return Err(GraphError::Inconsistency(format!(
                    "edge {} keyed under {}",
                    edge.id(),
                    id
                )));
            }
            if !edge.is_resolved() {
                continue;
            }
            for (node_id, socket_index) in [
                (edge.from_node(), edge.from_socket()),
                (edge.to_node(), edge.to_socket()),
            ] {
                let node = self.nodes.get(&node_id).ok_or_else(|| {
                    GraphError::Inconsistency(format!(
                        "resolved edge {} references missing node {}",
                        id, node_id
                    ))
                })?;
                let socket = node.socket(socket_index).ok_or_else(|| {
                    GraphError::Inconsistency(format!(
                        "resolved edge {} references missing socket {} on {}",
                        id, socket_index, node_id
                    ))
                })?;
                if socket.connected_edge() != Some(*id) {
                    return Err(GraphError::Inconsistency(format!(
                        "socket {} on {} does not hold edge {}",
                        socket_index, node_id, id
                    )));
                }
                if !node.incident_edges().any(|incident| incident == id) {
                    return Err(GraphError::Inconsistency(format!(
                        "edge {} absent from incident set of {}",
                        id, node_id
                    )));
                }
            }
        }
        for (node_id, node) in &self.nodes {
            for edge_id in node.incident_edges() {
                let edge = self.edges.get(edge_id).ok_or_else(|| {
                    GraphError::Inconsistency(format!(
                        "incident set of {} holds unknown edge {}",
                        node_id, edge_id
                    ))
                })?;
                if !edge.touches(*node_id) {
                    return Err(GraphError::Inconsistency(format!(
                        "incident set of {} holds unrelated edge {}",
                        node_id, edge_id
                    )));
                }
            }
        }
        Ok(())
    }
}
