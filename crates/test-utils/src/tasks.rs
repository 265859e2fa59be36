#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use devpipe::exec::Task;

/// Shared record of `<component>.<task>` invocations, in call order.
#[derive(Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, component: &str, task: &str) {
        self.entries
            .lock()
            .unwrap()
            .push(format!("{component}.{task}"));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `node` in the log; panics if it never ran.
    pub fn position(&self, node: &str) -> usize {
        self.entries()
            .iter()
            .position(|n| n == node)
            .unwrap_or_else(|| panic!("{node} was not executed"))
    }
}

/// Task that records every call and succeeds.
pub fn recording_task(name: &str, log: &ExecutionLog) -> Task {
    let log = log.clone();
    let task = name.to_string();
    Task::new(name, move |component| {
        log.record(component.name(), &task);
        Ok(())
    })
}

/// Task that records every call and always fails.
pub fn failing_task(name: &str, log: &ExecutionLog) -> Task {
    let log = log.clone();
    let task = name.to_string();
    Task::new(name, move |component| {
        log.record(component.name(), &task);
        bail!("{} failed", component.name())
    })
}

/// Task that fails only on the listed components.
pub fn failing_on(name: &str, log: &ExecutionLog, components: &[&str]) -> Task {
    let log = log.clone();
    let task = name.to_string();
    let failing: Vec<String> = components.iter().map(|c| c.to_string()).collect();
    Task::new(name, move |component| {
        log.record(component.name(), &task);
        if failing.iter().any(|c| c == component.name()) {
            bail!("{} failed", component.name());
        }
        Ok(())
    })
}

/// Task whose first invocation fails and every later one succeeds.
pub fn fail_first_task(name: &str, log: &ExecutionLog) -> Task {
    let log = log.clone();
    let task = name.to_string();
    let calls = Arc::new(AtomicUsize::new(0));
    Task::new(name, move |component| {
        log.record(component.name(), &task);
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            bail!("first call fails");
        }
        Ok(())
    })
}

/// Tracks how many task bodies run at the same time.
#[derive(Clone, Default)]
pub struct ConcurrencyGauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Task that sleeps for `delay` while counted as running.
    pub fn task(&self, name: &str, delay: Duration) -> Task {
        let gauge = self.clone();
        Task::new(name, move |_component| {
            let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            gauge.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(delay);
            gauge.current.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
