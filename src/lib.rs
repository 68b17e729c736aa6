//! Wiregraph - graph registry and persistence engine for node editors
//!
//! This library owns the data model of a node-based visual editor: typed
//! nodes with fixed socket layouts, directed edges between sockets, the
//! id-indexed registry that keeps adjacency consistent under churn, a
//! phased document loader with all-or-nothing semantics, a change
//! notification bus with nestable batching, and a debounced autosave
//! subscriber. Rendering, interaction and scripting live elsewhere and go
//! through the same public mutation API.

pub mod autosave;
pub mod constants;
pub mod document;
pub mod error;
pub mod events;
pub mod graph;
pub mod templates;

// Re-export commonly used types
pub use autosave::AutosaveObserver;
pub use error::GraphError;
pub use events::{BatchSummary, ChangeBus, GraphEvent, GraphObserver};
pub use graph::{Edge, EdgeId, GraphController, GraphStats, Node, NodeGraph, NodeId, Socket, SocketRole};
pub use templates::{NodeTemplate, TemplateRegistry};
