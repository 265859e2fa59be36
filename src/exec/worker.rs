// src/exec/worker.rs

//! Worker routine: pull one unit at a time, run it, report the outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::dag::NodeId;
use crate::exec::task::TaskFn;
use crate::project::Component;

/// A ready node with everything needed to run it.
pub(crate) struct WorkUnit {
    pub node: NodeId,
    pub component: Component,
    pub work: TaskFn,
}

/// Outcome of one unit, sent back to the drain routine.
pub(crate) struct UnitCompletion {
    pub node: NodeId,
    pub result: anyhow::Result<()>,
    /// `false` when the unit could not even be looked up.
    pub ran: bool,
}

/// Run units from the shared queue until it closes.
///
/// Work functions are synchronous and may block on child processes, so each
/// one runs on the blocking pool. A panicking work function is reported as a
/// failure of its unit.
pub(crate) async fn run_worker(
    id: usize,
    units: Arc<Mutex<mpsc::Receiver<WorkUnit>>>,
    done: mpsc::Sender<UnitCompletion>,
    aborted: Arc<AtomicBool>,
) {
    loop {
        let unit = {
            let mut rx = units.lock().await;
            rx.recv().await
        };
        let Some(WorkUnit {
            node,
            component,
            work,
        }) = unit
        else {
            break;
        };

        if aborted.load(Ordering::SeqCst) {
            warn!(worker = id, node = %node, "run aborted; skipping unit");
            continue;
        }

        info!(worker = id, node = %node, "executing");

        let result = match tokio::task::spawn_blocking(move || work(&component)).await {
            Ok(result) => result,
            Err(join_err) => Err(anyhow!("task panicked: {join_err}")),
        };

        let completion = UnitCompletion {
            node,
            result,
            ran: true,
        };
        if done.send(completion).await.is_err() {
            debug!(worker = id, "completion channel closed; worker exiting");
            break;
        }
    }

    debug!(worker = id, "worker finished (queue closed)");
}
