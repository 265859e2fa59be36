// src/exec/task.rs

//! Tasks and the task registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{PipelineError, Result};
use crate::exec::command::{BUILTIN_TASKS, command_task};
use crate::project::{Component, is_valid_key_name};

/// Work function applied to a single component.
pub type TaskFn = Arc<dyn Fn(&Component) -> anyhow::Result<()> + Send + Sync>;

/// A named operation (checkout, build, ...) applicable to any component.
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub work: TaskFn,
}

impl Task {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn(&Component) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            work: Arc::new(work),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Whether `name` can be used as a task name.
///
/// Task names end up in `depends.<task>` keys and `<component>.<task>` node
/// identifiers, so they follow the key grammar without any dots.
pub fn is_valid_task_name(name: &str) -> bool {
    is_valid_key_name(name) && !name.contains('.')
}

/// Lookup table of every task the command layer can run.
///
/// Built once at start-up and handed to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the shell-command tasks
    /// (`checkout`, `configure`, `build`, `install`).
    pub fn with_builtin_tasks() -> Self {
        let mut registry = Self::new();
        for name in BUILTIN_TASKS {
            registry.tasks.insert(name.to_string(), command_task(name));
        }
        registry
    }

    /// Add a task. Names must be unique and valid.
    pub fn register(&mut self, task: Task) -> Result<()> {
        if !is_valid_task_name(&task.name) {
            return Err(PipelineError::ConfigError(format!(
                "invalid task name '{}'",
                task.name
            )));
        }
        if self.tasks.contains_key(&task.name) {
            return Err(PipelineError::ConfigError(format!(
                "task '{}' is already registered",
                task.name
            )));
        }
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|n| n.as_str())
    }

    /// Tasks for `names`, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Task>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name)
                    .cloned()
                    .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))
            })
            .collect()
    }
}
