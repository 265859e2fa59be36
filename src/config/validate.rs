// src/config/validate.rs

//! Conversion from [`RawProjectFile`] to [`ProjectFile`].
//!
//! Component tables are flattened: nested tables become dotted keys, a string
//! becomes a single value, an array becomes one value per element and other
//! scalars are stringified.

use toml::Value;

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::{PipelineError, Result};
use crate::project::{Component, MemoryProject};

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = PipelineError;

    fn try_from(raw: RawProjectFile) -> Result<Self> {
        let mut project = MemoryProject::new();

        for (name, table) in &raw.component {
            project.insert(component_from_table(name, table)?);
        }

        Ok(ProjectFile {
            settings: raw.settings,
            project,
        })
    }
}

/// Build one component from its `[component.<name>]` table.
pub fn component_from_table(name: &str, table: &toml::Table) -> Result<Component> {
    let mut component = Component::new(name)?;

    let mut flat = Vec::new();
    flatten_table("", table, &mut flat)
        .map_err(|msg| PipelineError::ConfigError(format!("component '{name}': {msg}")))?;

    for (key, values) in flat {
        component.set_value(key, values)?;
    }
    Ok(component)
}

fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut Vec<(String, Vec<String>)>,
) -> std::result::Result<(), String> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Table(nested) => flatten_table(&key, nested, out)?,
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| scalar_to_string(&key, item))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                out.push((key, values));
            }
            scalar => {
                let value = scalar_to_string(&key, scalar)?;
                out.push((key, vec![value]));
            }
        }
    }
    Ok(())
}

fn scalar_to_string(key: &str, value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) | Value::Table(_) => {
            Err(format!("'{key}' must be a scalar or a list of scalars"))
        }
    }
}
