// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod project;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::dag::GraphResolver;
use crate::exec::{RunOptions, TaskRegistry, run_tasks};
use crate::project::Project;
use crate::types::ResolveStrategy;

/// High-level entry point used by `main.rs`.
///
/// Loads the project file, picks the tasks for the command from the
/// built-in registry, merges `[settings]` with the command-line overrides,
/// then either prints the plan (`--dry-run`) or runs it.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let file = load_and_validate(&config_path)
        .with_context(|| format!("loading project file {}", config_path.display()))?;

    let registry = TaskRegistry::with_builtin_tasks();
    let task_names = args.command.task_names();
    let tasks = registry.select(&task_names)?;

    let run_args = args.command.run_args();
    let strategy = run_args
        .dependencies
        .unwrap_or(file.settings.dependencies);
    let options = RunOptions {
        keep_going: run_args.keep_going || file.settings.keep_going,
        max_tasks: run_args.jobs.unwrap_or(file.settings.jobs),
    };

    let targets = if run_args.components.is_empty() {
        file.project.component_names()
    } else {
        run_args.components.clone()
    };
    debug!(?targets, ?task_names, %strategy, "resolved command line");

    if run_args.dry_run {
        let resolver = GraphResolver::for_strategy(strategy, &file.project, &targets, &task_names)?;
        print_dry_run(&resolver.plan(), strategy, &options);
        return Ok(());
    }

    let project: Arc<dyn Project> = Arc::new(file.project);
    let summary = run_tasks(project, &targets, &tasks, strategy, options).await?;
    info!(
        executed = summary.executed,
        succeeded = summary.succeeded,
        "all tasks completed"
    );
    Ok(())
}

/// Print the readiness waves a run would go through.
fn print_dry_run(waves: &[Vec<String>], strategy: ResolveStrategy, options: &RunOptions) {
    println!("devpipe dry-run");
    println!("  dependencies = {strategy}");
    println!("  keep_going = {}", options.keep_going);
    println!("  jobs = {}", options.worker_count());
    println!();

    let total: usize = waves.iter().map(|w| w.len()).sum();
    println!("waves ({}, {total} task(s)):", waves.len());
    for (index, wave) in waves.iter().enumerate() {
        println!("  {}: {}", index + 1, wave.join(" "));
    }

    debug!("dry-run complete (no execution)");
}
