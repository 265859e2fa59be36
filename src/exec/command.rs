// src/exec/command.rs

//! Built-in tasks that run shell commands configured on the component.
//!
//! A component opts in per task with `<task>.command` (one or more commands,
//! run in order) and optionally `<task>.workdir`. Components without a
//! command for the task have nothing to do and succeed.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::exec::task::Task;
use crate::project::Component;

/// Names of the tasks [`TaskRegistry::with_builtin_tasks`] provides.
///
/// [`TaskRegistry::with_builtin_tasks`]: crate::exec::TaskRegistry::with_builtin_tasks
pub const BUILTIN_TASKS: &[&str] = &["checkout", "configure", "build", "install"];

/// A task named `name` that runs the component's `<name>.command` values.
pub fn command_task(name: &str) -> Task {
    let task = name.to_string();
    Task::new(name, move |component: &Component| run_commands(component, &task))
}

fn run_commands(component: &Component, task: &str) -> Result<()> {
    let commands = component.get_value(&format!("{task}.command"));
    if commands.is_empty() {
        info!(
            component = %component.name(),
            task = %task,
            "no command configured; nothing to do"
        );
        return Ok(());
    }

    let workdir = component.get_value(&format!("{task}.workdir")).first();

    for cmd in commands {
        info!(
            component = %component.name(),
            task = %task,
            cmd = %cmd,
            "running command"
        );

        let mut command = shell_command(cmd);
        command
            .env("DEVPIPE_COMPONENT", component.name())
            .env("DEVPIPE_TASK", task)
            .stdin(Stdio::null());
        if let Some(dir) = workdir {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .with_context(|| format!("spawning `{cmd}` for {}.{task}", component.name()))?;

        debug!(
            component = %component.name(),
            task = %task,
            exit_code = status.code().unwrap_or(-1),
            "command exited"
        );

        if !status.success() {
            bail!(
                "`{cmd}` exited with status {}",
                status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
    }

    Ok(())
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}
