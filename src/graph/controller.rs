//! Public graph facade
//!
//! `GraphController` is the single mutation API shared by every caller: UI,
//! scripting, tests. It coordinates the owning registry, the template
//! provider and the change bus, and publishes a notification for every
//! state change. Nothing mutates the registry behind its back.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use glam::Vec2;
use uuid::Uuid;

use crate::document;
use crate::error::GraphError;
use crate::events::{ChangeBus, GraphEvent, GraphObserver};
use crate::templates::{NodeTemplate, TemplateRegistry};

use super::edge::EdgeId;
use super::graph::{GraphStats, NodeGraph};
use super::node::{Node, NodeId};

pub struct GraphController {
    graph: NodeGraph,
    templates: TemplateRegistry,
    bus: ChangeBus,
}

impl GraphController {
    /// Creates a controller over an empty graph. The template provider is
    /// passed in explicitly; tests construct their own.
    pub fn new(templates: TemplateRegistry) -> Self {
        Self {
            graph: NodeGraph::new(),
            templates,
            bus: ChangeBus::new(),
        }
    }

    // ---- Accessors ----

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    // ---- Observer management ----

    pub fn attach_observer(&mut self, observer: Rc<RefCell<dyn GraphObserver>>) {
        self.bus.attach(observer);
    }

    pub fn detach_observer(&mut self, observer: &Rc<RefCell<dyn GraphObserver>>) {
        self.bus.detach(observer);
    }

    // ---- Batch scoping ----

    pub fn begin_batch(&mut self) {
        self.bus.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.bus.end_batch();
    }

    pub fn is_batching(&self) -> bool {
        self.bus.is_batching()
    }

    /// Runs `f` inside a batch scope. The scope closes on every exit path,
    /// including early `?` returns from the closure, so notifications can
    /// never be left suppressed.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.bus.begin_batch();
        let result = f(self);
        self.bus.end_batch();
        result
    }

    // ---- Node operations ----

    /// Creates a node of a registered type at a position; returns its id
    pub fn create_node(&mut self, node_type: &str, x: f32, y: f32) -> Result<NodeId, GraphError> {
        let template = self
            .templates
            .get(node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(node_type.to_string()))?;
        let node = Node::from_template(Uuid::new_v4(), template, Vec2::new(x, y));
        let id = self.graph.add_node(node)?;
        log::debug!("node created: {} ({})", id, node_type);
        self.bus.publish(GraphEvent::NodeAdded { node: id });
        Ok(id)
    }

    /// Deletes a node and every edge connected to it. Edge removals are
    /// published before the node removal, so listeners never observe a
    /// removed node with live edges.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let (_, removed_edges) = self.graph.remove_node(&id)?;
        log::debug!("node deleted: {} ({} edges)", id, removed_edges.len());
        for edge in removed_edges {
            self.bus.publish(GraphEvent::EdgeRemoved { edge });
        }
        self.bus.publish(GraphEvent::NodeRemoved { node: id });
        Ok(())
    }

    /// Moves a node by a delta
    pub fn move_node(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<(), GraphError> {
        let old = self
            .graph
            .node(&id)
            .ok_or(GraphError::NodeNotFound(id))?
            .position();
        self.set_node_position(id, old.x + dx, old.y + dy)
    }

    /// Sets a node's absolute position
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) -> Result<(), GraphError> {
        let node = self.graph.node_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        let old = node.position();
        let new = Vec2::new(x, y);
        node.set_position(new);
        self.bus.publish(GraphEvent::NodeMoved { node: id, old, new });
        Ok(())
    }

    // ---- Edge operations ----

    /// Connects an output socket to an input socket; returns the edge id
    pub fn connect_nodes(
        &mut self,
        from_node: NodeId,
        from_socket: usize,
        to_node: NodeId,
        to_socket: usize,
    ) -> Result<EdgeId, GraphError> {
        let id = self
            .graph
            .connect(Uuid::new_v4(), from_node, from_socket, to_node, to_socket)?;
        log::debug!("edge created: {}", id);
        self.bus.publish(GraphEvent::EdgeAdded { edge: id });
        Ok(id)
    }

    /// Deletes an edge
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<(), GraphError> {
        self.graph.remove_edge(&id)?;
        log::debug!("edge deleted: {}", id);
        self.bus.publish(GraphEvent::EdgeRemoved { edge: id });
        Ok(())
    }

    // ---- Queries ----

    pub fn all_nodes(&self) -> Vec<NodeId> {
        self.graph.node_ids().copied().collect()
    }

    pub fn all_edges(&self) -> Vec<EdgeId> {
        self.graph.edge_ids().copied().collect()
    }

    /// Edges connected to one node, via its incident set (O(degree))
    pub fn node_edges(&self, id: NodeId) -> Result<Vec<EdgeId>, GraphError> {
        self.graph.edges_of(&id)
    }

    pub fn is_valid_node_type(&self, node_type: &str) -> bool {
        self.templates.has_type(node_type)
    }

    pub fn available_node_types(&self) -> Vec<String> {
        self.templates.available_types()
    }

    /// Registers a node type at runtime (scripting/plugin surface)
    pub fn register_node_type(&mut self, template: NodeTemplate) {
        self.templates.register(template);
    }

    // ---- Graph-wide operations ----

    /// Removes everything, publishing a single cleared notification instead
    /// of per-item events
    pub fn clear(&mut self) {
        self.graph.clear();
        log::debug!("graph cleared");
        self.bus.publish(GraphEvent::GraphCleared);
    }

    /// Saves the graph to a file and publishes a saved notification
    pub fn save_to_file(&mut self, path: &Path) -> Result<(), GraphError> {
        document::save_graph(&self.graph, path)?;
        self.bus.publish(GraphEvent::GraphSaved {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Replaces the live graph with the contents of a document file.
    ///
    /// All-or-nothing: the document is loaded and resolved into a scratch
    /// graph first, so on any failure the live graph is untouched and stays
    /// editable. Success publishes one loaded notification, not one event
    /// per imported item.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), GraphError> {
        let loaded = document::load_graph(path, &self.templates)?;
        log::info!(
            "graph loaded from {}: {} nodes, {} edges",
            path.display(),
            loaded.node_count(),
            loaded.edge_count()
        );
        self.graph = loaded;
        self.bus.publish(GraphEvent::GraphLoaded {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Renders the current graph as a document value (scripting surface)
    pub fn to_document(&self) -> document::GraphDocument {
        document::document_from_graph(&self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BatchSummary;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        moved: Vec<(NodeId, Vec2, Vec2)>,
        edge_added: Vec<EdgeId>,
        edge_removed: Vec<EdgeId>,
        cleared: usize,
        loaded: usize,
        batches: Vec<usize>,
        // Full interleaved order of removal events, for cascade ordering
        removal_order: Vec<String>,
    }

    impl GraphObserver for Recorder {
        fn on_node_added(&mut self, node: NodeId) {
            self.added.push(node);
        }
        fn on_node_removed(&mut self, node: NodeId) {
            self.removed.push(node);
            self.removal_order.push(format!("node:{}", node));
        }
        fn on_node_moved(&mut self, node: NodeId, old: Vec2, new: Vec2) {
            self.moved.push((node, old, new));
        }
        fn on_edge_added(&mut self, edge: EdgeId) {
            self.edge_added.push(edge);
        }
        fn on_edge_removed(&mut self, edge: EdgeId) {
            self.edge_removed.push(edge);
            self.removal_order.push(format!("edge:{}", edge));
        }
        fn on_graph_cleared(&mut self) {
            self.cleared += 1;
        }
        fn on_graph_loaded(&mut self, _path: &Path) {
            self.loaded += 1;
        }
        fn on_batch_committed(&mut self, summary: &BatchSummary) {
            self.batches.push(summary.len());
        }
    }

    fn controller_with_recorder() -> (GraphController, Rc<RefCell<Recorder>>) {
        let mut controller = GraphController::new(TemplateRegistry::with_builtins());
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        controller.attach_observer(recorder.clone());
        (controller, recorder)
    }

    #[test]
    fn create_node_publishes_and_uses_template_counts() {
        let (mut controller, recorder) = controller_with_recorder();
        let id = controller.create_node("SPLIT", 10.0, 20.0).unwrap();

        let node = controller.graph().node(&id).unwrap();
        assert_eq!(node.input_count(), 1);
        assert_eq!(node.output_count(), 2);
        assert_eq!(recorder.borrow().added, vec![id]);
    }

    #[test]
    fn create_node_rejects_unknown_type() {
        let (mut controller, recorder) = controller_with_recorder();
        assert!(matches!(
            controller.create_node("WIDGET", 0.0, 0.0),
            Err(GraphError::UnknownNodeType(_))
        ));
        assert!(recorder.borrow().added.is_empty());
    }

    #[test]
    fn delete_node_publishes_edges_before_node() {
        let (mut controller, recorder) = controller_with_recorder();
        let source = controller.create_node("SOURCE", 0.0, 0.0).unwrap();
        let sink = controller.create_node("SINK", 100.0, 0.0).unwrap();
        let edge = controller.connect_nodes(source, 0, sink, 0).unwrap();

        controller.delete_node(sink).unwrap();

        let recorder = recorder.borrow();
        assert_eq!(
            recorder.removal_order,
            vec![format!("edge:{}", edge), format!("node:{}", sink)]
        );
        assert_eq!(controller.graph().node_count(), 1);
        assert_eq!(controller.graph().edge_count(), 0);
    }

    #[test]
    fn move_node_publishes_old_and_new_positions() {
        let (mut controller, recorder) = controller_with_recorder();
        let id = controller.create_node("SOURCE", 10.0, 10.0).unwrap();

        controller.move_node(id, 5.0, -5.0).unwrap();
        controller.set_node_position(id, 0.0, 0.0).unwrap();

        let recorder = recorder.borrow();
        assert_eq!(
            recorder.moved[0],
            (id, Vec2::new(10.0, 10.0), Vec2::new(15.0, 5.0))
        );
        assert_eq!(
            recorder.moved[1],
            (id, Vec2::new(15.0, 5.0), Vec2::ZERO)
        );
    }

    #[test]
    fn interactive_failure_leaves_graph_unchanged() {
        let (mut controller, _) = controller_with_recorder();
        let source = controller.create_node("SOURCE", 0.0, 0.0).unwrap();
        let sink = controller.create_node("SINK", 100.0, 0.0).unwrap();
        controller.connect_nodes(source, 0, sink, 0).unwrap();

        // Occupied target rejects, existing connection untouched
        let second_source = controller.create_node("SOURCE", 0.0, 50.0).unwrap();
        assert!(controller.connect_nodes(second_source, 0, sink, 0).is_err());
        assert_eq!(controller.graph().edge_count(), 1);
        controller.graph().validate().unwrap();
    }

    #[test]
    fn batch_delivers_one_summary() {
        let (mut controller, recorder) = controller_with_recorder();

        controller.batch(|controller| {
            for i in 0..4 {
                controller.create_node("TRANSFORM", i as f32 * 10.0, 0.0).unwrap();
            }
        });

        let recorder = recorder.borrow();
        assert!(recorder.added.is_empty());
        assert_eq!(recorder.batches, vec![4]);
    }

    #[test]
    fn batch_scope_closes_on_early_return() {
        let (mut controller, _) = controller_with_recorder();

        let result: Result<(), GraphError> = controller.batch(|controller| {
            controller.create_node("SOURCE", 0.0, 0.0)?;
            controller.create_node("WIDGET", 0.0, 0.0)?; // fails
            Ok(())
        });

        assert!(result.is_err());
        assert!(!controller.is_batching());
    }

    #[test]
    fn clear_publishes_single_event() {
        let (mut controller, recorder) = controller_with_recorder();
        let source = controller.create_node("SOURCE", 0.0, 0.0).unwrap();
        let sink = controller.create_node("SINK", 100.0, 0.0).unwrap();
        controller.connect_nodes(source, 0, sink, 0).unwrap();
        recorder.borrow_mut().removal_order.clear();

        controller.clear();

        let recorder = recorder.borrow();
        assert_eq!(recorder.cleared, 1);
        assert!(recorder.removal_order.is_empty());
        assert!(controller.graph().is_empty());
    }

    #[test]
    fn failed_load_leaves_live_graph_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"version":"1.0","nodes":[
                {"id":"0e62e1b8-0000-4000-8000-000000000001","type":"SOURCE",
                 "x":0.0,"y":0.0,"inputs":0,"outputs":1},
                {"id":"0e62e1b8-0000-4000-8000-000000000002","type":"SINK",
                 "x":1.0,"y":1.0,"inputs":1,"outputs":0}],
              "connections":[
                {"id":"0e62e1b8-0000-4000-8000-000000000003",
                 "from_node":"0e62e1b8-0000-4000-8000-000000000001","from_socket":4,
                 "to_node":"0e62e1b8-0000-4000-8000-000000000002","to_socket":0}]}"#,
        )
        .unwrap();

        let (mut controller, recorder) = controller_with_recorder();
        let survivor = controller.create_node("SOURCE", 42.0, 7.0).unwrap();

        let result = controller.load_from_file(&path);
        assert!(matches!(result, Err(GraphError::SocketOutOfRange { .. })));

        // Pre-load contents are byte-identical: same single node, same position
        assert_eq!(controller.all_nodes(), vec![survivor]);
        let node = controller.graph().node(&survivor).unwrap();
        assert_eq!(node.position(), Vec2::new(42.0, 7.0));
        assert_eq!(recorder.borrow().loaded, 0);
    }

    #[test]
    fn successful_load_replaces_graph_with_one_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let (mut controller, recorder) = controller_with_recorder();
        let source = controller.create_node("SOURCE", 0.0, 0.0).unwrap();
        let sink = controller.create_node("SINK", 100.0, 0.0).unwrap();
        controller.connect_nodes(source, 0, sink, 0).unwrap();
        controller.save_to_file(&path).unwrap();

        // Overwrite the live graph then restore it from the file
        controller.clear();
        recorder.borrow_mut().added.clear();
        controller.load_from_file(&path).unwrap();

        let recorder = recorder.borrow();
        assert_eq!(recorder.loaded, 1);
        assert!(recorder.added.is_empty());
        assert_eq!(controller.graph().node_count(), 2);
        assert_eq!(controller.graph().edge_count(), 1);
        controller.graph().validate().unwrap();
    }
}
