//! Persisted document format
//!
//! A document is a JSON object with a version attribute, optional metadata,
//! node records and edge (connection) records. Each entity renders and
//! parses its own record; the loader and writer only compose them.
//!
//! Entity ids are opaque unique strings. Decorative formatting that other
//! producers use (surrounding braces, uppercase hex) is normalized away at
//! the parse boundary.

pub mod loader;
pub mod writer;

pub use loader::{graph_from_document, load_graph};
pub use writer::{document_from_graph, save_graph};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;

/// Root container for a persisted graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<EdgeRecord>,
}

/// Metadata for save files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub created: String,
    pub modified: String,
    pub creator: String,
    pub description: String,
}

/// One node element: identity, type and resolved socket counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub x: f32,
    pub y: f32,
    pub inputs: usize,
    pub outputs: usize,
}

/// One edge element: identity plus endpoint node ids and socket indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    pub from_node: String,
    pub from_socket: usize,
    pub to_node: String,
    pub to_socket: usize,
}

/// Parses an entity id, accepting braced and uppercase forms
pub fn parse_entity_id(raw: &str) -> Result<Uuid, GraphError> {
    let trimmed = raw.trim();
    let bare = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(trimmed);
    Uuid::parse_str(bare).map_err(|_| GraphError::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_normalization_accepts_decorated_forms() {
        let id = Uuid::new_v4();
        let plain = id.to_string();
        let braced = format!("{{{}}}", plain);
        let upper = plain.to_uppercase();

        assert_eq!(parse_entity_id(&plain).unwrap(), id);
        assert_eq!(parse_entity_id(&braced).unwrap(), id);
        assert_eq!(parse_entity_id(&upper).unwrap(), id);
        assert_eq!(parse_entity_id(&format!("  {} ", braced)).unwrap(), id);
    }

    #[test]
    fn id_parse_rejects_garbage() {
        assert!(matches!(
            parse_entity_id("not-an-id"),
            Err(GraphError::InvalidId(_))
        ));
        assert!(matches!(
            parse_entity_id("{unclosed"),
            Err(GraphError::InvalidId(_))
        ));
    }

    #[test]
    fn document_json_shape() {
        let json = r#"{
            "version": "1.0",
            "nodes": [
                {"id": "a3e1b0c2-0000-4000-8000-000000000001", "type": "SOURCE",
                 "x": 10.0, "y": 20.0, "inputs": 0, "outputs": 1}
            ],
            "connections": []
        }"#;
        let doc: GraphDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].node_type, "SOURCE");
        assert!(doc.metadata.is_none());
    }
}
