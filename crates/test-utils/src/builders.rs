#![allow(dead_code)]

use std::sync::Arc;

use devpipe::project::{Component, MemoryProject, Project};

/// Builder for `Component` to simplify test setup.
pub struct ComponentBuilder {
    component: Component,
}

impl ComponentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name).expect("valid component name in test"),
        }
    }

    /// Declare `depends.<task> = deps`, one value per dependency.
    pub fn depends(self, task: &str, deps: &[&str]) -> Self {
        self.value(&format!("depends.{task}"), deps)
    }

    pub fn value(mut self, key: &str, values: &[&str]) -> Self {
        self.component
            .set_value(key, values.iter().map(|v| v.to_string()).collect())
            .expect("valid key name in test");
        self
    }

    pub fn build(self) -> Component {
        self.component
    }
}

/// Builder for `MemoryProject`.
#[derive(Default)]
pub struct ProjectBuilder {
    project: MemoryProject,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, component: ComponentBuilder) -> Self {
        self.project.insert(component.build());
        self
    }

    /// Component with no attributes.
    pub fn plain(self, name: &str) -> Self {
        self.with(ComponentBuilder::new(name))
    }

    /// Component whose `task` depends on `deps`.
    pub fn depending(self, name: &str, task: &str, deps: &[&str]) -> Self {
        self.with(ComponentBuilder::new(name).depends(task, deps))
    }

    pub fn build(self) -> MemoryProject {
        self.project
    }

    pub fn build_shared(self) -> Arc<dyn Project> {
        Arc::new(self.project)
    }
}

/// `foo` <- `bar`, `baz` <- `biz` on the `build` task.
pub fn diamond_project() -> MemoryProject {
    ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "build", &["foo"])
        .depending("baz", "build", &["foo"])
        .depending("biz", "build", &["bar", "baz"])
        .build()
}

/// Two independent chains on the `build` task: `foo` <- `bar`, `baz` <- `biz`.
pub fn parallel_project() -> MemoryProject {
    ProjectBuilder::new()
        .plain("foo")
        .depending("bar", "build", &["foo"])
        .plain("baz")
        .depending("biz", "build", &["baz"])
        .build()
}

pub fn targets(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
