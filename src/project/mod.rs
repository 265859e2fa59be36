// src/project/mod.rs

//! Project model: a named collection of components.
//!
//! The scheduler only needs read access through the [`Project`] trait;
//! [`MemoryProject`] is what the project-file loader and the tests build.

pub mod component;

use std::collections::BTreeMap;

pub use component::{Component, is_valid_component_name, is_valid_key_name};

/// Read access to the components of a project.
pub trait Project: Send + Sync {
    /// Look up a component by name.
    fn component(&self, name: &str) -> Option<&Component>;

    /// Names of every component in the project.
    fn component_names(&self) -> Vec<String>;
}

/// In-memory project keyed by component name.
#[derive(Debug, Clone, Default)]
pub struct MemoryProject {
    components: BTreeMap<String, Component>,
}

impl MemoryProject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a component.
    pub fn insert(&mut self, component: Component) {
        self.components
            .insert(component.name().to_string(), component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromIterator<Component> for MemoryProject {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        let mut project = MemoryProject::new();
        for component in iter {
            project.insert(component);
        }
        project
    }
}

impl Project for MemoryProject {
    fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    fn component_names(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }
}
