// src/project/component.rs

//! A single named component and its attribute map.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{PipelineError, Result};

static COMPONENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z](?:([-_])?[a-zA-Z0-9])+)+$").expect("component name pattern")
});

static KEY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9_]*(?:\.)?)+$").expect("key name pattern"));

/// Keys under this prefix are reserved for the tool itself.
const RESERVED_PREFIX: &str = "devpipe.";

/// Prefix of the attribute family the scheduler reads (`depends.<task>`).
pub const DEPENDS_PREFIX: &str = "depends.";

/// Whether `name` is a legal component identifier.
///
/// Names are letters and digits, optionally joined by single `-` or `_`, and
/// must start with a letter. Dots are never legal, which is what keeps the
/// `<component>.<task>` node encoding unambiguous.
pub fn is_valid_component_name(name: &str) -> bool {
    COMPONENT_NAME.is_match(name)
}

/// Whether `key` is a legal (non-reserved) attribute key.
pub fn is_valid_key_name(key: &str) -> bool {
    KEY_NAME.is_match(key) && !key.starts_with(RESERVED_PREFIX)
}

/// A named unit of work with an ordered, multi-valued attribute map.
///
/// The scheduler only ever reads `depends.<task>`; everything else is for
/// task implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: String,
    values: BTreeMap<String, Vec<String>>,
}

impl Component {
    /// Create an empty component, validating its name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_valid_component_name(&name) {
            return Err(PipelineError::InvalidComponentName(name));
        }
        Ok(Self {
            name,
            values: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All values stored under `key` (empty if the key is absent).
    pub fn get_value(&self, key: &str) -> &[String] {
        self.values.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Replace the values stored under `key`, validating the key name.
    pub fn set_value(&mut self, key: impl Into<String>, values: Vec<String>) -> Result<()> {
        let key = key.into();
        if !is_valid_key_name(&key) {
            return Err(PipelineError::InvalidKeyName(key));
        }
        self.values.insert(key, values);
        Ok(())
    }

    pub fn erase_value(&mut self, key: &str) {
        self.values.remove(key);
    }

    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    /// Components that must finish `task` before this one may run it.
    ///
    /// Each stored value is a comma-separated list; entries are trimmed and
    /// empty entries are dropped.
    pub fn dependencies(&self, task: &str) -> Vec<String> {
        self.get_value(&format!("{DEPENDS_PREFIX}{task}"))
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|dep| !dep.is_empty())
            .map(str::to_string)
            .collect()
    }
}
