//! Debounced autosave observer
//!
//! Subscribes to the change bus and persists the graph after mutations have
//! settled. Every delivered mutation marks the observer dirty and restarts
//! a debounce deadline; the host pumps `tick()` cooperatively and the write
//! happens once the deadline expires with no further activity. Save
//! failures are logged and retried on the next dirty cycle, never
//! escalated.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::constants;
use crate::document;
use crate::events::{BatchSummary, GraphObserver};
use crate::graph::{EdgeId, NodeGraph, NodeId};

pub struct AutosaveObserver {
    path: PathBuf,
    delay: Duration,
    enabled: bool,
    dirty: bool,
    deadline: Option<Instant>,
    saving: bool,
    saves: u64,
}

impl AutosaveObserver {
    /// Creates an autosave observer writing to `path` with the default delay
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delay: Duration::from_millis(constants::autosave::DEFAULT_DELAY_MS),
            enabled: true,
            dirty: false,
            deadline: None,
            saving: false,
            saves: 0,
        }
    }

    /// Sets the debounce delay for subsequent changes
    pub fn set_delay(&mut self, delay: Duration) {
        log::debug!("autosave delay: {} ms", delay.as_millis());
        self.delay = delay;
    }

    /// Retargets the autosave destination
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
        log::debug!("autosave path: {}", self.path.display());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enables or disables autosaving. Disabling cancels any pending write.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.deadline = None;
        }
        log::debug!("autosave enabled: {}", enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while unsaved changes are pending
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Successful writes so far
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// Instant of the pending debounced write, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Marks the graph dirty and restarts the debounce deadline. Each new
    /// change replaces the pending deadline rather than adding another.
    fn schedule(&mut self) {
        if !self.enabled {
            return;
        }
        self.dirty = true;
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Cooperative pump: writes the graph if the debounce deadline has
    /// expired with changes still pending. Returns true if a save happened.
    pub fn tick(&mut self, graph: &NodeGraph) -> bool {
        self.tick_at(graph, Instant::now())
    }

    /// `tick` against an explicit clock reading
    pub fn tick_at(&mut self, graph: &NodeGraph, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => self.perform_save(graph),
            _ => false,
        }
    }

    /// Cancels the pending deadline and writes immediately if dirty
    pub fn save_now(&mut self, graph: &NodeGraph) -> bool {
        self.deadline = None;
        self.perform_save(graph)
    }

    /// Teardown hook: one best-effort save of pending changes. Failures are
    /// logged, never escalated.
    pub fn flush(&mut self, graph: &NodeGraph) {
        if self.dirty && self.enabled {
            self.save_now(graph);
        }
    }

    fn perform_save(&mut self, graph: &NodeGraph) -> bool {
        if self.saving {
            // Non-reentrant: overlapping triggers are ignored
            return false;
        }
        if !self.enabled || !self.dirty {
            return false;
        }
        self.saving = true;
        let start = Instant::now();
        let result = document::save_graph(graph, &self.path);
        self.saving = false;

        match result {
            Ok(()) => {
                self.dirty = false;
                self.deadline = None;
                self.saves += 1;
                log::info!(
                    "autosave: {} nodes, {} edges to {} in {} ms",
                    graph.node_count(),
                    graph.edge_count(),
                    self.path.display(),
                    start.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                // Stay dirty; the next change restarts the cycle
                self.deadline = None;
                log::warn!("autosave to {} failed: {}", self.path.display(), err);
                false
            }
        }
    }
}

impl GraphObserver for AutosaveObserver {
    fn on_node_added(&mut self, _node: NodeId) {
        self.schedule();
    }

    fn on_node_removed(&mut self, _node: NodeId) {
        self.schedule();
    }

    fn on_node_moved(&mut self, _node: NodeId, _old: Vec2, _new: Vec2) {
        self.schedule();
    }

    fn on_edge_added(&mut self, _edge: EdgeId) {
        self.schedule();
    }

    fn on_edge_removed(&mut self, _edge: EdgeId) {
        self.schedule();
    }

    fn on_graph_cleared(&mut self) {
        self.schedule();
    }

    fn on_batch_committed(&mut self, summary: &BatchSummary) {
        if summary.has_mutations() {
            self.schedule();
        }
    }
}
