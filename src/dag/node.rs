// src/dag/node.rs

//! Identifiers for schedulable units.

use std::fmt;

/// Canonical node identifier used throughout the scheduler:
/// `"<component>.<task>"`.
pub type NodeId = String;

/// Build the identifier for a (component, task) pair.
pub fn node_id(component: &str, task: &str) -> NodeId {
    format!("{component}.{task}")
}

/// The atomic schedulable unit: one task applied to one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTask {
    pub component: String,
    pub task: String,
}

impl ComponentTask {
    pub fn new(component: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            task: task.into(),
        }
    }

    /// Split a node identifier back into its parts.
    ///
    /// Component names cannot contain dots, so the first dot is the separator.
    /// Returns `None` for identifiers without one.
    pub fn parse(node: &str) -> Option<Self> {
        let (component, task) = node.split_once('.')?;
        if component.is_empty() || task.is_empty() {
            return None;
        }
        Some(Self::new(component, task))
    }

    pub fn id(&self) -> NodeId {
        node_id(&self.component, &self.task)
    }
}

impl fmt::Display for ComponentTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.task)
    }
}
