//! Error types for graph mutation and persistence
//!
//! Uses `thiserror` for structured, matchable error variants. Every public
//! mutation on the graph returns a `Result` with one of these variants;
//! there is no silent partial success.

use thiserror::Error;
use uuid::Uuid;

use crate::graph::SocketRole;

/// Errors produced by graph operations and document persistence.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Node type has no registered template.
    #[error("unknown node type: '{0}'")]
    UnknownNodeType(String),

    /// An entity with this id is already registered.
    #[error("duplicate id: {0}")]
    DuplicateId(Uuid),

    /// No node with this id exists in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(Uuid),

    /// No edge with this id exists in the graph.
    #[error("edge not found: {0}")]
    EdgeNotFound(Uuid),

    /// Socket index is outside the node's socket range.
    #[error("socket index {index} out of range for node {node} ({count} sockets)")]
    SocketOutOfRange {
        node: Uuid,
        index: usize,
        count: usize,
    },

    /// Socket exists but has the wrong role for this end of a connection.
    #[error("socket {index} on node {node} is not an {expected:?} socket")]
    RoleMismatch {
        node: Uuid,
        index: usize,
        expected: SocketRole,
    },

    /// Target or source socket already holds a connection (capacity 1).
    #[error("socket {index} on node {node} already has a connection")]
    SocketOccupied { node: Uuid, index: usize },

    /// Both endpoints name the same node.
    #[error("cannot connect node {0} to itself")]
    SelfConnection(Uuid),

    /// An edge names a node that is not present in the graph.
    #[error("edge {edge} references missing node {node}")]
    DanglingEndpoint { edge: Uuid, node: Uuid },

    /// An id string in a document could not be parsed.
    #[error("invalid entity id: '{0}'")]
    InvalidId(String),

    /// Document could not be parsed as JSON.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Source unreadable or destination unwritable.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An internal invariant was violated. Treated as a defect: asserted in
    /// debug builds, logged and degraded in release builds.
    #[error("graph inconsistency: {0}")]
    Inconsistency(String),
}

impl GraphError {
    /// True for errors caused by invalid input rather than I/O or internal
    /// state. During a document load, any validation error aborts the whole
    /// load; during an interactive operation it rejects only that operation.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            GraphError::Malformed(_) | GraphError::Io(_) | GraphError::Inconsistency(_)
        )
    }
}
