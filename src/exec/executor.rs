// src/exec/executor.rs

//! Bounded worker pool that runs resolved nodes.
//!
//! Four kinds of participants talk over capacity-1 channels:
//!
//! - the resolver thread streams ready batches;
//! - a dispatcher turns each node into a [`WorkUnit`];
//! - `max_tasks` workers run units;
//! - a single drain routine reports outcomes back to the resolver, which is
//!   what unblocks the next batch.
//!
//! The run ends when the resolver closes its stream and every unit that was
//! handed out has been reported.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::anyhow;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dag::{ComponentTask, GraphResolver, NodeId, Resolver};
use crate::errors::{FailedTask, PipelineError, Result};
use crate::exec::task::{Task, TaskFn};
use crate::exec::worker::{UnitCompletion, WorkUnit, run_worker};
use crate::project::Project;
use crate::types::ResolveStrategy;

/// How a run reacts to failures and how wide it fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Keep scheduling independent work after a failure.
    pub keep_going: bool,
    /// Worker count; `0` means one per available CPU.
    pub max_tasks: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            keep_going: false,
            max_tasks: default_max_tasks(),
        }
    }
}

impl RunOptions {
    pub fn worker_count(&self) -> usize {
        if self.max_tasks == 0 {
            default_max_tasks()
        } else {
            self.max_tasks
        }
    }
}

/// Number of workers used when none is configured.
pub fn default_max_tasks() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Counts from a run that finished without any failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Units whose work function was invoked.
    pub executed: usize,
    pub succeeded: usize,
}

#[derive(Default)]
struct DrainOutcome {
    executed: usize,
    succeeded: usize,
    failures: Vec<FailedTask>,
}

/// Build the graph for `targets` x `tasks` with `strategy` and run it.
///
/// Returns [`PipelineError::TaskFailed`] carrying the first failure if any
/// unit failed. Graph errors (missing component, cycle) are returned before
/// anything runs.
pub async fn run_tasks(
    project: Arc<dyn Project>,
    targets: &[String],
    tasks: &[Task],
    strategy: ResolveStrategy,
    options: RunOptions,
) -> Result<RunSummary> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(PipelineError::ConfigError(format!(
                "task '{}' requested more than once",
                task.name
            )));
        }
    }

    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let resolver = GraphResolver::for_strategy(strategy, project.as_ref(), targets, &names)?;

    info!(
        targets = targets.len(),
        tasks = ?names,
        strategy = %strategy,
        "starting run"
    );
    run_with_resolver(project, Arc::new(resolver), tasks, options).await
}

/// Run every node `resolver` releases, with the work function of its task.
pub async fn run_with_resolver<R>(
    project: Arc<dyn Project>,
    resolver: Arc<R>,
    tasks: &[Task],
    options: RunOptions,
) -> Result<RunSummary>
where
    R: Resolver + 'static,
{
    let work: HashMap<String, TaskFn> = tasks
        .iter()
        .map(|t| (t.name.clone(), Arc::clone(&t.work)))
        .collect();
    let worker_count = options.worker_count();

    let (ready_tx, ready_rx) = mpsc::channel::<Vec<NodeId>>(1);
    let (unit_tx, unit_rx) = mpsc::channel::<WorkUnit>(1);
    let (done_tx, done_rx) = mpsc::channel::<UnitCompletion>(1);
    let aborted = Arc::new(AtomicBool::new(false));

    resolver.resolve(ready_tx)?;

    let units = Arc::new(Mutex::new(unit_rx));
    let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_count);
    for id in 0..worker_count {
        workers.push(tokio::spawn(run_worker(
            id,
            Arc::clone(&units),
            done_tx.clone(),
            Arc::clone(&aborted),
        )));
    }
    debug!(workers = worker_count, keep_going = options.keep_going, "worker pool started");

    let dispatcher = tokio::spawn(dispatch(
        ready_rx,
        unit_tx,
        done_tx,
        project,
        work,
        Arc::clone(&aborted),
    ));
    let drain = tokio::spawn(drain(
        done_rx,
        Arc::clone(&resolver),
        options.keep_going,
        aborted,
    ));

    dispatcher
        .await
        .map_err(|e| anyhow!("dispatcher task failed: {e}"))?;
    for worker in workers {
        worker.await.map_err(|e| anyhow!("worker task failed: {e}"))?;
    }
    let outcome = drain.await.map_err(|e| anyhow!("drain task failed: {e}"))?;

    let DrainOutcome {
        executed,
        succeeded,
        failures,
    } = outcome;
    info!(executed, succeeded, failed = failures.len(), "run finished");

    let total = failures.len();
    match failures.into_iter().next() {
        Some(failure) => Err(PipelineError::TaskFailed { failure, total }),
        None => Ok(RunSummary {
            executed,
            succeeded,
        }),
    }
}

/// Turn ready batches into work units.
///
/// Keeps consuming batches after an abort so the resolver thread is never
/// left blocked on a full channel.
async fn dispatch(
    mut ready: mpsc::Receiver<Vec<NodeId>>,
    units: mpsc::Sender<WorkUnit>,
    done: mpsc::Sender<UnitCompletion>,
    project: Arc<dyn Project>,
    work: HashMap<String, TaskFn>,
    aborted: Arc<AtomicBool>,
) {
    while let Some(batch) = ready.recv().await {
        for node in batch {
            if aborted.load(Ordering::SeqCst) {
                debug!(node = %node, "run aborted; not dispatching");
                continue;
            }

            match lookup(&node, project.as_ref(), &work) {
                Ok(unit) => {
                    if units.send(unit).await.is_err() {
                        warn!("all workers gone; dispatcher stopping");
                        return;
                    }
                }
                Err(err) => {
                    let completion = UnitCompletion {
                        node,
                        result: Err(err),
                        ran: false,
                    };
                    if done.send(completion).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
    debug!("ready stream closed; dispatcher finished");
}

fn lookup(
    node: &str,
    project: &dyn Project,
    work: &HashMap<String, TaskFn>,
) -> anyhow::Result<WorkUnit> {
    let parsed =
        ComponentTask::parse(node).ok_or_else(|| anyhow!("malformed node identifier '{node}'"))?;
    let component =
        project
            .component(&parsed.component)
            .ok_or_else(|| PipelineError::ComponentNotFound {
                name: parsed.component.clone(),
            })?;
    let work = work
        .get(&parsed.task)
        .ok_or_else(|| PipelineError::UnknownTask(parsed.task.clone()))?;

    Ok(WorkUnit {
        node: node.to_string(),
        component: component.clone(),
        work: Arc::clone(work),
    })
}

/// Report every completion to the resolver and collect the outcome.
async fn drain<R: Resolver>(
    mut done: mpsc::Receiver<UnitCompletion>,
    resolver: Arc<R>,
    keep_going: bool,
    aborted: Arc<AtomicBool>,
) -> DrainOutcome {
    let mut outcome = DrainOutcome::default();

    while let Some(UnitCompletion { node, result, ran }) = done.recv().await {
        if ran {
            outcome.executed += 1;
        }

        match result {
            Ok(()) => {
                outcome.succeeded += 1;
                resolver.complete(&node);
                info!(node = %node, "task completed");
            }
            Err(err) => {
                let mut dependents = resolver.fail(&node);
                if !keep_going && !aborted.swap(true, Ordering::SeqCst) {
                    warn!(node = %node, "aborting run after failure");
                    dependents.extend(resolver.abort());
                }
                error!(
                    node = %node,
                    error = %err,
                    dropped = dependents.len(),
                    "task failed"
                );
                outcome.failures.push(FailedTask {
                    node,
                    error: err,
                    dependents,
                });
            }
        }
    }

    outcome
}
