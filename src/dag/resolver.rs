// src/dag/resolver.rs

//! Thread-safe resolver: owns the [`ResolutionState`] behind a mutex and
//! condition variable, and streams ready batches to a consumer.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::graph::{ReverseDepGraph, build_reverse_deps};
use crate::dag::node::{NodeId, node_id};
use crate::dag::state::ResolutionState;
use crate::errors::{PipelineError, Result};
use crate::project::Project;
use crate::types::ResolveStrategy;

/// Drains a dependency graph in order.
///
/// `resolve` produces one batch per readiness wave; the consumer reports back
/// through `complete`/`fail`, which is what lets the next wave through.
pub trait Resolver: Send + Sync {
    /// Start streaming ready batches to `out`.
    ///
    /// The stream is finite and cannot be restarted: `out` is dropped once no
    /// pending, ready or in-flight node remains, or once the receiver goes
    /// away. Sibling nodes within a batch are in no particular order.
    fn resolve(&self, out: mpsc::Sender<Vec<NodeId>>) -> Result<()>;

    /// Report that `node` finished successfully.
    fn complete(&self, node: &str);

    /// Report that `node` failed. Returns every node that transitively
    /// depended on it and has been dropped from the schedule.
    fn fail(&self, node: &str) -> Vec<NodeId>;

    /// Drop every node that has not been handed out yet and let the stream
    /// close once it is drained. Returns the dropped nodes.
    fn abort(&self) -> Vec<NodeId>;
}

struct Monitor {
    state: Mutex<ResolutionState>,
    cond: Condvar,
}

impl Monitor {
    fn lock(&self) -> MutexGuard<'_, ResolutionState> {
        // Critical sections never panic midway, so the state is consistent
        // even if some other holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stream(&self, out: mpsc::Sender<Vec<NodeId>>) {
        let mut state = self.lock();

        while state.has_work() {
            while state.has_ready() {
                let batch = state.take_ready();
                drop(state);

                debug!(?batch, "resolver: releasing ready batch");
                if out.blocking_send(batch).is_err() {
                    debug!("resolver: ready stream receiver dropped; stopping");
                    return;
                }

                state = self.lock();
            }

            if state.has_work() {
                state = self.cond.wait(state).unwrap_or_else(PoisonError::into_inner);
            }
        }

        debug!("resolver: graph drained; closing ready stream");
    }
}

/// The resolver shared by both graph-construction strategies.
///
/// Cloning is cheap and every clone drives the same state.
#[derive(Clone)]
pub struct GraphResolver {
    monitor: Arc<Monitor>,
}

impl std::fmt::Debug for GraphResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphResolver")
            .field("state", &*self.monitor.lock())
            .finish()
    }
}

impl GraphResolver {
    /// Wrap `graph` and validate that it can be fully drained.
    ///
    /// Fails with [`PipelineError::UnresolvableGraph`] if a dependency cycle
    /// keeps some node blocked forever.
    pub fn from_graph(graph: ReverseDepGraph) -> Result<Self> {
        let state = ResolutionState::from_graph(graph);
        state.validate()?;

        Ok(Self {
            monitor: Arc::new(Monitor {
                state: Mutex::new(state),
                cond: Condvar::new(),
            }),
        })
    }

    /// Pick the constructor for `strategy`.
    pub fn for_strategy<P, T, K>(
        strategy: ResolveStrategy,
        project: &P,
        targets: &[T],
        tasks: &[K],
    ) -> Result<Self>
    where
        P: Project + ?Sized,
        T: AsRef<str>,
        K: AsRef<str>,
    {
        match strategy {
            ResolveStrategy::Deep => resolve_deep(project, targets, tasks),
            ResolveStrategy::Reverse => resolve_reverse(project, targets, tasks),
        }
    }

    /// Copy of the current state, for diagnostics and tests.
    pub fn snapshot(&self) -> ResolutionState {
        self.monitor.lock().clone()
    }

    /// Readiness waves the remaining graph would produce if every node
    /// succeeded. Does not change the live state.
    pub fn plan(&self) -> Vec<Vec<NodeId>> {
        self.monitor.lock().waves()
    }
}

impl Resolver for GraphResolver {
    fn resolve(&self, out: mpsc::Sender<Vec<NodeId>>) -> Result<()> {
        let monitor = Arc::clone(&self.monitor);
        thread::Builder::new()
            .name("devpipe-resolver".to_string())
            .spawn(move || monitor.stream(out))?;
        Ok(())
    }

    fn complete(&self, node: &str) {
        let mut state = self.monitor.lock();
        if state.complete(node) {
            debug!(node = %node, ready = state.ready().len(), "node completed");
        }
        self.monitor.cond.notify_all();
    }

    fn fail(&self, node: &str) -> Vec<NodeId> {
        let chain = self.monitor.lock().fail(node);
        self.monitor.cond.notify_all();
        chain
    }

    fn abort(&self) -> Vec<NodeId> {
        let discarded = self.monitor.lock().abort();
        info!(discarded = discarded.len(), "resolver aborted; remaining work dropped");
        self.monitor.cond.notify_all();
        discarded
    }
}

/// Resolver over exactly the transitive dependencies of `targets`.
pub fn resolve_deep<P, T, K>(project: &P, targets: &[T], tasks: &[K]) -> Result<GraphResolver>
where
    P: Project + ?Sized,
    T: AsRef<str>,
    K: AsRef<str>,
{
    let graph = build_reverse_deps(project, targets, tasks)?;
    GraphResolver::from_graph(graph)
}

/// Resolver over `targets` plus everything in the project that transitively
/// depends on them.
///
/// The graph is built over every component, then trimmed to what is
/// reachable forward from the targets' nodes.
pub fn resolve_reverse<P, T, K>(project: &P, targets: &[T], tasks: &[K]) -> Result<GraphResolver>
where
    P: Project + ?Sized,
    T: AsRef<str>,
    K: AsRef<str>,
{
    let full = build_reverse_deps(project, &project.component_names(), tasks)?;

    let mut roots = Vec::new();
    for target in targets {
        let target = target.as_ref();
        if project.component(target).is_none() {
            return Err(PipelineError::ComponentNotFound {
                name: target.to_string(),
            });
        }
        roots.extend(tasks.iter().map(|task| node_id(target, task.as_ref())));
    }

    let trimmed = full.dependents_closure(roots);
    debug!(
        full = full.len(),
        trimmed = trimmed.len(),
        "trimmed project graph to dependents of targets"
    );
    GraphResolver::from_graph(trimmed)
}
