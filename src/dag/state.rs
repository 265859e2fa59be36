// src/dag/state.rs

//! Resolution state machine: remaining prerequisite counts, the ready queue,
//! and the reverse edges still in play.
//!
//! This type performs no locking and no IO; [`GraphResolver`] wraps it in a
//! mutex/condvar monitor. Keeping it pure lets the dry-run validation and the
//! `--dry-run` plan simulate a whole session on a copy.
//!
//! [`GraphResolver`]: crate::dag::GraphResolver

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{info, warn};

use crate::dag::graph::{DepSet, ReverseDepGraph, find_cycle};
use crate::dag::node::NodeId;
use crate::errors::{PipelineError, Result};

/// Mutable graph state for one scheduling session.
///
/// A node is in exactly one of: pending (`dep_counts > 0`), ready, in flight
/// (handed out but not completed), or retired. Counts only decrease and nodes
/// are only removed.
#[derive(Debug, Clone, Default)]
pub struct ResolutionState {
    edges: BTreeMap<NodeId, DepSet>,
    dep_counts: HashMap<NodeId, usize>,
    ready: Vec<NodeId>,
    /// Members of `ready`, for constant-time membership checks.
    queued: HashSet<NodeId>,
    /// Completed, failed or cascade-failed nodes; later calls for them are
    /// ignored so a double completion cannot corrupt the counts.
    retired: HashSet<NodeId>,
}

impl ResolutionState {
    /// Compute in-degrees for every node and seed the ready queue with the
    /// nodes that have none.
    pub fn from_graph(graph: ReverseDepGraph) -> Self {
        let mut dep_counts = HashMap::new();
        let mut ready = Vec::new();

        for (node, count) in graph.in_degrees() {
            if count == 0 {
                ready.push(node);
            } else {
                dep_counts.insert(node, count);
            }
        }

        Self {
            edges: graph.into_edges(),
            dep_counts,
            queued: ready.iter().cloned().collect(),
            ready,
            retired: HashSet::new(),
        }
    }

    /// Whether anything is left: pending, ready, or in flight.
    pub fn has_work(&self) -> bool {
        !self.edges.is_empty() || !self.dep_counts.is_empty() || !self.ready.is_empty()
    }

    pub fn has_ready(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Nodes currently ready but not yet handed out.
    pub fn ready(&self) -> &[NodeId] {
        &self.ready
    }

    /// Remaining prerequisite count of every pending node.
    pub fn dep_counts(&self) -> &HashMap<NodeId, usize> {
        &self.dep_counts
    }

    /// Reverse edges of nodes that have not completed yet.
    pub fn edges(&self) -> &BTreeMap<NodeId, DepSet> {
        &self.edges
    }

    /// Hand out every ready node as one batch.
    pub fn take_ready(&mut self) -> Vec<NodeId> {
        self.queued.clear();
        std::mem::take(&mut self.ready)
    }

    fn pop_ready(&mut self) -> Option<NodeId> {
        let node = self.ready.pop()?;
        self.queued.remove(&node);
        Some(node)
    }

    /// Mark `node` as completed, unblocking its dependents.
    ///
    /// Returns `false` (and changes nothing) if the node already finished or
    /// still has unresolved prerequisites.
    pub fn complete(&mut self, node: &str) -> bool {
        if self.retired.contains(node) {
            warn!(node = %node, "completion for a node that already finished; ignoring");
            return false;
        }
        if self.dep_counts.contains_key(node) {
            warn!(node = %node, "completion for a node that is still blocked; ignoring");
            return false;
        }

        self.retired.insert(node.to_string());
        // completed without ever being handed out
        if self.queued.remove(node) {
            self.ready.retain(|n| n != node);
        }

        if let Some(dependents) = self.edges.remove(node) {
            for dependent in dependents {
                if let Some(count) = self.dep_counts.get_mut(&dependent) {
                    if *count == 1 {
                        // last blocking prerequisite
                        self.dep_counts.remove(&dependent);
                        self.queued.insert(dependent.clone());
                        self.ready.push(dependent);
                    } else {
                        *count -= 1;
                    }
                }
            }
        }
        true
    }

    /// Mark `node` as failed and drop everything that transitively waits on
    /// it. Returns the dropped dependents (the fail-chain), excluding `node`.
    pub fn fail(&mut self, node: &str) -> Vec<NodeId> {
        if self.retired.contains(node) {
            warn!(node = %node, "failure for a node that already finished; ignoring");
            return Vec::new();
        }

        let mut chain: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = vec![node.to_string()];

        while let Some(name) = stack.pop() {
            if let Some(dependents) = self.edges.remove(&name) {
                stack.extend(dependents);
            }
            self.dep_counts.remove(&name);
            chain.insert(name);
        }

        self.ready.retain(|n| !chain.contains(n));
        self.queued.retain(|n| !chain.contains(n));
        self.retired.extend(chain.iter().cloned());
        chain.remove(node);

        let mut chain: Vec<NodeId> = chain.into_iter().collect();
        chain.sort();
        if !chain.is_empty() {
            info!(node = %node, dropped = ?chain, "failure cascaded to dependents");
        }
        chain
    }

    /// Discard every node that has not been handed out yet.
    ///
    /// Returns the discarded pending and ready nodes. Nodes already in flight
    /// are forgotten too; completing them afterwards is a no-op.
    pub fn abort(&mut self) -> Vec<NodeId> {
        let mut discarded: Vec<NodeId> = self
            .dep_counts
            .drain()
            .map(|(node, _)| node)
            .chain(self.ready.drain(..))
            .collect();
        self.queued.clear();
        discarded.sort();

        self.retired.extend(discarded.iter().cloned());
        self.edges.clear();
        discarded
    }

    /// Dry-run the whole session on a copy: repeatedly complete ready nodes
    /// until none are left. Anything remaining is blocked forever, which
    /// means the graph contains a cycle.
    pub fn validate(&self) -> Result<()> {
        let mut sim = self.clone();
        while let Some(node) = sim.pop_ready() {
            sim.complete(&node);
        }

        if sim.has_work() {
            return Err(PipelineError::UnresolvableGraph {
                cycle: find_cycle(&sim.edges),
            });
        }
        Ok(())
    }

    /// Readiness waves of a full, all-success session, simulated on a copy.
    ///
    /// Each wave is sorted; waves are in dependency order.
    pub fn waves(&self) -> Vec<Vec<NodeId>> {
        let mut sim = self.clone();
        let mut waves = Vec::new();

        loop {
            let mut batch = sim.take_ready();
            if batch.is_empty() {
                break;
            }
            batch.sort();
            for node in &batch {
                sim.complete(node);
            }
            waves.push(batch);
        }

        waves
    }
}
