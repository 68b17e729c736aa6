//! Graph data structures and the public mutation facade

pub mod controller;
pub mod edge;
pub mod graph;
pub mod node;
pub mod socket;

pub use controller::GraphController;
pub use edge::{Edge, EdgeId};
pub use graph::{GraphStats, NodeGraph};
pub use node::{Node, NodeId};
pub use socket::{Socket, SocketRole};
