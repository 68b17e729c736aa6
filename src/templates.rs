//! Node type templates - data-driven socket layout descriptors
//!
//! All node creation goes through a template lookup: interactive creation,
//! document loading and scripting all resolve a type name to the same
//! structural descriptor. The registry is an explicitly constructed value
//! passed to whoever needs it, so tests can build a fresh one instead of
//! resetting process-wide state.

use std::collections::{HashMap, HashSet};

/// Structural descriptor for a node type: how many input and output sockets
/// a node of this type carries. Socket counts are fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTemplate {
    pub node_type: String,
    pub inputs: usize,
    pub outputs: usize,
}

impl NodeTemplate {
    /// Creates a new template descriptor
    pub fn new(node_type: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        Self {
            node_type: node_type.into(),
            inputs,
            outputs,
        }
    }
}

/// Registry of known node types.
///
/// Ships with the built-in types and accepts runtime registrations from
/// scripting or plugins. Built-in types cannot be unregistered.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, NodeTemplate>,
    builtin: HashSet<String>,
}

impl TemplateRegistry {
    /// Creates an empty registry with no types at all
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            builtin: HashSet::new(),
        }
    }

    /// Creates a registry pre-populated with the built-in node types
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for template in [
            NodeTemplate::new("SOURCE", 0, 1),
            NodeTemplate::new("SINK", 1, 0),
            NodeTemplate::new("SPLIT", 1, 2),
            NodeTemplate::new("MERGE", 2, 1),
            NodeTemplate::new("TRANSFORM", 1, 1),
        ] {
            registry.builtin.insert(template.node_type.clone());
            registry.templates.insert(template.node_type.clone(), template);
        }
        registry
    }

    /// Looks up the template for a node type
    pub fn get(&self, node_type: &str) -> Option<&NodeTemplate> {
        self.templates.get(node_type)
    }

    /// Checks whether a node type is registered
    pub fn has_type(&self, node_type: &str) -> bool {
        self.templates.contains_key(node_type)
    }

    /// Registers a node type, replacing any previous registration with the
    /// same name. Registering over a built-in shadows its descriptor but the
    /// type remains protected from removal.
    pub fn register(&mut self, template: NodeTemplate) {
        log::debug!("template registered: {}", template.node_type);
        self.templates.insert(template.node_type.clone(), template);
    }

    /// Removes a registered node type. Built-in types cannot be removed.
    ///
    /// Returns true if the type was removed.
    pub fn unregister(&mut self, node_type: &str) -> bool {
        if self.builtin.contains(node_type) {
            log::warn!("refusing to unregister built-in node type: {}", node_type);
            return false;
        }
        self.templates.remove(node_type).is_some()
    }

    /// Drops every runtime registration, restoring the built-in set.
    /// Useful for plugin reload scenarios.
    pub fn clear_registered(&mut self) {
        let builtin = &self.builtin;
        self.templates.retain(|name, _| builtin.contains(name));
    }

    /// All known type names, sorted for stable presentation
    pub fn available_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.templates.keys().cloned().collect();
        types.sort();
        types
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when no types are registered
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
