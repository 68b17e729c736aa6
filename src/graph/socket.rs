//! Socket types - connection points on a node
//!
//! A socket has no identity of its own: it is addressed by (owning node,
//! index) where the index is global within the node, inputs first. Each
//! socket holds at most one connected edge.

use super::edge::EdgeId;

/// Role of a socket (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketRole {
    Input,
    Output,
}

/// A connection point on a node, capacity 1
#[derive(Debug, Clone)]
pub struct Socket {
    role: SocketRole,
    index: usize,
    connected: Option<EdgeId>,
}

impl Socket {
    /// Creates an unconnected socket at the given node-global index
    pub fn new(role: SocketRole, index: usize) -> Self {
        Self {
            role,
            index,
            connected: None,
        }
    }

    pub fn role(&self) -> SocketRole {
        self.role
    }

    /// Node-global index (inputs occupy the low indices, outputs follow)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_input(&self) -> bool {
        matches!(self.role, SocketRole::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.role, SocketRole::Output)
    }

    /// The edge currently occupying this socket, if any
    pub fn connected_edge(&self) -> Option<EdgeId> {
        self.connected
    }

    pub fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    /// Occupies the socket with an edge. The caller must have verified the
    /// socket is free; attaching over an existing connection is an
    /// inconsistency and is ignored beyond a log message.
    pub(crate) fn attach(&mut self, edge: EdgeId) {
        if let Some(existing) = self.connected {
            debug_assert!(false, "socket {} already occupied by {}", self.index, existing);
            log::error!(
                "attach on occupied socket {} (edge {} kept, {} dropped)",
                self.index,
                existing,
                edge
            );
            return;
        }
        self.connected = Some(edge);
    }

    /// Releases the socket if it is occupied by this edge
    pub(crate) fn detach(&mut self, edge: EdgeId) {
        match self.connected {
            Some(current) if current == edge => self.connected = None,
            _ => {
                debug_assert!(false, "detach of edge {} not occupying socket {}", edge, self.index);
                log::error!(
                    "detach of edge {} that does not occupy socket {}",
                    edge,
                    self.index
                );
            }
        }
    }
}
