// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`task`] holds the task type and the registry the command layer builds.
//! - [`command`] provides the built-in shell-command tasks.
//! - [`executor`] runs a resolved graph on a bounded worker pool.

pub mod command;
pub mod executor;
pub mod task;
mod worker;

pub use command::{BUILTIN_TASKS, command_task};
pub use executor::{RunOptions, RunSummary, default_max_tasks, run_tasks, run_with_resolver};
pub use task::{Task, TaskFn, TaskRegistry, is_valid_task_name};
