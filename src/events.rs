//! Change notification bus with nestable batching
//!
//! Observers subscribe to a fixed vocabulary of graph change events. Bulk
//! operations open a batch scope: while a batch is open, events are queued
//! instead of delivered, and closing the outermost scope delivers one
//! consolidated summary rather than replaying the storm item by item.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::Vec2;

use crate::graph::{EdgeId, NodeId};

/// A single graph change
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded { node: NodeId },
    NodeRemoved { node: NodeId },
    NodeMoved { node: NodeId, old: Vec2, new: Vec2 },
    EdgeAdded { edge: EdgeId },
    EdgeRemoved { edge: EdgeId },
    GraphCleared,
    GraphLoaded { path: PathBuf },
    GraphSaved { path: PathBuf },
}

impl GraphEvent {
    /// True for events that change graph contents (as opposed to
    /// load/save notifications)
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            GraphEvent::GraphLoaded { .. } | GraphEvent::GraphSaved { .. }
        )
    }
}

/// Everything that happened inside one batch scope, delivered as a single
/// notification when the outermost scope closes
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    events: Vec<GraphEvent>,
}

impl BatchSummary {
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True if any queued event mutated the graph
    pub fn has_mutations(&self) -> bool {
        self.events.iter().any(GraphEvent::is_mutation)
    }

    pub fn nodes_added(&self) -> usize {
        self.count(|event| matches!(event, GraphEvent::NodeAdded { .. }))
    }

    pub fn nodes_removed(&self) -> usize {
        self.count(|event| matches!(event, GraphEvent::NodeRemoved { .. }))
    }

    pub fn edges_added(&self) -> usize {
        self.count(|event| matches!(event, GraphEvent::EdgeAdded { .. }))
    }

    pub fn edges_removed(&self) -> usize {
        self.count(|event| matches!(event, GraphEvent::EdgeRemoved { .. }))
    }

    fn count(&self, predicate: impl Fn(&GraphEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }
}

/// Interface for observing graph changes. All handlers default to no-ops so
/// observers implement only what they care about.
pub trait GraphObserver {
    fn on_node_added(&mut self, _node: NodeId) {}
    fn on_node_removed(&mut self, _node: NodeId) {}
    fn on_node_moved(&mut self, _node: NodeId, _old: Vec2, _new: Vec2) {}
    fn on_edge_added(&mut self, _edge: EdgeId) {}
    fn on_edge_removed(&mut self, _edge: EdgeId) {}
    fn on_graph_cleared(&mut self) {}
    fn on_graph_loaded(&mut self, _path: &Path) {}
    fn on_graph_saved(&mut self, _path: &Path) {}

    /// Delivered once when the outermost batch scope closes, in place of
    /// the individual events queued inside it
    fn on_batch_committed(&mut self, _summary: &BatchSummary) {}
}

/// Observer registration and event delivery.
///
/// Single-threaded: observers are `Rc<RefCell<...>>` values dispatched
/// synchronously on the caller's thread.
#[derive(Default)]
pub struct ChangeBus {
    observers: Vec<Rc<RefCell<dyn GraphObserver>>>,
    batch_depth: u32,
    pending: Vec<GraphEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for all subsequent events
    pub fn attach(&mut self, observer: Rc<RefCell<dyn GraphObserver>>) {
        self.observers.push(observer);
    }

    /// Unregisters an observer previously passed to `attach`
    pub fn detach(&mut self, observer: &Rc<RefCell<dyn GraphObserver>>) {
        self.observers.retain(|other| !Rc::ptr_eq(other, observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Opens a batch scope; scopes nest
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Closes one batch scope. Only the transition back to depth zero
    /// delivers the queued events, as one consolidated summary. An
    /// unbalanced call is logged and ignored rather than corrupting the
    /// depth counter.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            debug_assert!(false, "end_batch without begin_batch");
            log::error!("end_batch without matching begin_batch ignored");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth > 0 {
            return;
        }
        if self.pending.is_empty() {
            return;
        }
        let summary = BatchSummary {
            events: std::mem::take(&mut self.pending),
        };
        log::debug!("batch committed: {} events", summary.len());
        for observer in &self.observers {
            observer.borrow_mut().on_batch_committed(&summary);
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Queues the event if a batch is open, otherwise delivers immediately
    pub fn publish(&mut self, event: GraphEvent) {
        if self.batch_depth > 0 {
            self.pending.push(event);
            return;
        }
        for observer in &self.observers {
            let mut observer = observer.borrow_mut();
            match &event {
                GraphEvent::NodeAdded { node } => observer.on_node_added(*node),
                GraphEvent::NodeRemoved { node } => observer.on_node_removed(*node),
                GraphEvent::NodeMoved { node, old, new } => {
                    observer.on_node_moved(*node, *old, *new)
                }
                GraphEvent::EdgeAdded { edge } => observer.on_edge_added(*edge),
                GraphEvent::EdgeRemoved { edge } => observer.on_edge_removed(*edge),
                GraphEvent::GraphCleared => observer.on_graph_cleared(),
                GraphEvent::GraphLoaded { path } => observer.on_graph_loaded(path),
                GraphEvent::GraphSaved { path } => observer.on_graph_saved(path),
            }
        }
    }
}
