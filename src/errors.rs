// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::fmt;

use thiserror::Error;

use crate::dag::NodeId;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Couldn't find component: {name}")]
    ComponentNotFound { name: String },

    #[error("Invalid component name: {0}")]
    InvalidComponentName(String),

    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Unable to resolve targets; blocked nodes: {}", .cycle.join(" -> "))]
    UnresolvableGraph { cycle: Vec<NodeId> },

    #[error("{failure} ({total} total error(s))")]
    TaskFailed { failure: FailedTask, total: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A unit that failed during a run, plus the dependents that were dropped
/// from the schedule because of it.
#[derive(Debug)]
pub struct FailedTask {
    pub node: NodeId,
    pub error: anyhow::Error,
    pub dependents: Vec<NodeId>,
}

impl fmt::Display for FailedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' failed: {:#}", self.node, self.error)?;
        if !self.dependents.is_empty() {
            write!(f, " (skipped {} dependent(s))", self.dependents.len())?;
        }
        Ok(())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
