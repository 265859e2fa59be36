// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::ResolveStrategy;

/// Command-line arguments for `devpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devpipe",
    version,
    about = "Run build-pipeline tasks across a graph of dependent components.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML).
    ///
    /// Default: `devpipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "devpipe.toml", global = true)]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch component sources.
    Checkout(RunArgs),

    /// Build components.
    Build(RunArgs),

    /// Check out, then build.
    Bootstrap(RunArgs),

    /// Run arbitrary tasks, in the order given.
    Run {
        /// Task to run; repeat or comma-separate for several.
        #[arg(
            long = "task",
            value_name = "NAME",
            required = true,
            value_delimiter = ','
        )]
        tasks: Vec<String>,

        #[command(flatten)]
        args: RunArgs,
    },
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Keep running independent work after a failure.
    #[arg(long)]
    pub keep_going: bool,

    /// How targets expand into a graph. Overrides `[settings].dependencies`.
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub dependencies: Option<ResolveStrategy>,

    /// Number of concurrent tasks (0 = available parallelism).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Resolve and print the execution waves, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Components to target. Defaults to every component in the project.
    #[arg(value_name = "COMPONENT")]
    pub components: Vec<String>,
}

impl Command {
    /// Task names this command runs, in order.
    pub fn task_names(&self) -> Vec<String> {
        match self {
            Command::Checkout(_) => vec!["checkout".to_string()],
            Command::Build(_) => vec!["build".to_string()],
            Command::Bootstrap(_) => vec!["checkout".to_string(), "build".to_string()],
            Command::Run { tasks, .. } => tasks.clone(),
        }
    }

    pub fn run_args(&self) -> &RunArgs {
        match self {
            Command::Checkout(args) | Command::Build(args) | Command::Bootstrap(args) => args,
            Command::Run { args, .. } => args,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
