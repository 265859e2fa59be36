// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::project::MemoryProject;
use crate::types::ResolveStrategy;

/// Project file as read from TOML, before any validation.
///
/// ```toml
/// [settings]
/// dependencies = "deep"
/// keep_going = false
/// jobs = 0
///
/// [component.foo]
/// depends.build = ["bar", "baz"]
/// build.command = "make -j4"
///
/// [component.bar]
/// checkout.command = ["git clone https://example.invalid/bar.git ."]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjectFile {
    /// Run defaults from `[settings]`.
    #[serde(default)]
    pub settings: SettingsSection,

    /// Every `[component.<name>]` table, still in TOML form.
    ///
    /// Nested tables (`depends.build = ...`) are flattened into dotted keys
    /// during validation.
    #[serde(default)]
    pub component: BTreeMap<String, toml::Table>,
}

/// `[settings]` section. Command-line flags override these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsSection {
    /// Which graph the targets expand into.
    #[serde(default)]
    pub dependencies: ResolveStrategy,

    /// Keep running independent work after a failure.
    #[serde(default)]
    pub keep_going: bool,

    /// Worker count; `0` uses the available parallelism.
    #[serde(default)]
    pub jobs: usize,
}

/// A validated project file.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub settings: SettingsSection,
    pub project: MemoryProject,
}
