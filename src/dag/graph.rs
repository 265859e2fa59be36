// src/dag/graph.rs

//! Reverse-dependency graph over component-task nodes, and the builder that
//! derives it from per-component `depends.<task>` declarations.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::node::{NodeId, node_id};
use crate::errors::{PipelineError, Result};
use crate::project::Project;

/// Nodes unblocked by the completion of a single node.
pub type DepSet = BTreeSet<NodeId>;

/// Mapping `node -> nodes that must wait for it`.
///
/// An edge `A -> B` means B must not run until A completes. Every node that
/// takes part in the schedule has an entry, even when nothing waits on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseDepGraph {
    edges: BTreeMap<NodeId, DepSet>,
}

impl ReverseDepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` with no dependents. Returns `true` on first insertion.
    pub fn insert_node(&mut self, node: &str) -> bool {
        if self.edges.contains_key(node) {
            return false;
        }
        self.edges.insert(node.to_string(), DepSet::new());
        true
    }

    /// Record that `dependent` must wait for `prerequisite`.
    pub fn insert_edge(&mut self, prerequisite: &str, dependent: &str) {
        self.edges
            .entry(prerequisite.to_string())
            .or_default()
            .insert(dependent.to_string());
    }

    pub fn contains(&self, node: &str) -> bool {
        self.edges.contains_key(node)
    }

    /// Immediate dependents of `node`.
    pub fn dependents_of(&self, node: &str) -> Option<&DepSet> {
        self.edges.get(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(|n| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of prerequisite edges pointing at each node.
    ///
    /// Nodes that only ever appear as an edge target are included as well.
    pub fn in_degrees(&self) -> BTreeMap<NodeId, usize> {
        let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
        for (node, dependents) in &self.edges {
            counts.entry(node.clone()).or_insert(0);
            for dependent in dependents {
                *counts.entry(dependent.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Sub-graph reachable by following edges forward from `roots`: the roots
    /// themselves plus every node that transitively waits on one of them.
    pub fn dependents_closure<I>(&self, roots: I) -> ReverseDepGraph
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut trimmed: BTreeMap<NodeId, DepSet> = BTreeMap::new();
        let mut stack: Vec<NodeId> = roots.into_iter().collect();

        while let Some(node) = stack.pop() {
            if trimmed.contains_key(&node) {
                continue;
            }
            let dependents = self.edges.get(&node).cloned().unwrap_or_default();
            stack.extend(dependents.iter().cloned());
            trimmed.insert(node, dependents);
        }

        trimmed.into()
    }

    pub(crate) fn into_edges(self) -> BTreeMap<NodeId, DepSet> {
        self.edges
    }
}

impl From<BTreeMap<NodeId, DepSet>> for ReverseDepGraph {
    fn from(edges: BTreeMap<NodeId, DepSet>) -> Self {
        Self { edges }
    }
}

/// Build the reverse-dependency graph for `targets` over `tasks`.
///
/// For task index `i` of a component, every declared `depends.<task[i]>`
/// component is expanded over `tasks[..=i]` only, so a dependency's later
/// tasks are never pulled in ahead of an earlier dependent task. Within one
/// component `task[i-1]` always precedes `task[i]`.
///
/// Cycles are not detected here; see
/// [`ResolutionState::validate`](crate::dag::ResolutionState::validate).
pub fn build_reverse_deps<P, T, K>(project: &P, targets: &[T], tasks: &[K]) -> Result<ReverseDepGraph>
where
    P: Project + ?Sized,
    T: AsRef<str>,
    K: AsRef<str>,
{
    let tasks: Vec<&str> = tasks.iter().map(|t| t.as_ref()).collect();
    let mut graph = ReverseDepGraph::new();
    let mut visited: HashSet<NodeId> = HashSet::new();

    // Pending visits: (component, number of leading tasks to expand).
    // An explicit stack keeps arbitrarily long dependency chains off the
    // call stack.
    let mut pending: Vec<(String, usize)> = targets
        .iter()
        .rev()
        .map(|t| (t.as_ref().to_string(), tasks.len()))
        .collect();

    while let Some((target, prefix)) = pending.pop() {
        for (index, task) in tasks[..prefix].iter().enumerate() {
            let node = node_id(&target, task);
            if !visited.insert(node.clone()) {
                continue;
            }
            graph.insert_node(&node);

            let component = project
                .component(&target)
                .ok_or_else(|| PipelineError::ComponentNotFound {
                    name: target.clone(),
                })?;

            for dependency in component.dependencies(task) {
                graph.insert_edge(&node_id(&dependency, task), &node);
                pending.push((dependency, index + 1));
            }

            if index > 0 {
                graph.insert_edge(&node_id(&target, tasks[index - 1]), &node);
            }
        }
    }

    debug!(
        nodes = graph.len(),
        targets = targets.len(),
        "built reverse-dependency graph"
    );
    Ok(graph)
}

/// Pick out a dependency cycle among `residual` edges, for error reporting.
///
/// Returns the members of the first strongly connected component that is an
/// actual cycle (closed by repeating its first node), or every residual node
/// when no cycle can be isolated.
pub(crate) fn find_cycle(residual: &BTreeMap<NodeId, DepSet>) -> Vec<NodeId> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (node, dependents) in residual {
        graph.add_node(node.as_str());
        for dependent in dependents {
            graph.add_edge(node.as_str(), dependent.as_str(), ());
        }
    }

    for mut scc in tarjan_scc(&graph) {
        let is_cycle = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
        if is_cycle {
            scc.sort_unstable();
            let mut cycle: Vec<NodeId> = scc.iter().map(|n| n.to_string()).collect();
            cycle.push(scc[0].to_string());
            return cycle;
        }
    }

    residual.keys().cloned().collect()
}
