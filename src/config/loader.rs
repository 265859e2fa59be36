// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::Result;

/// Name of the project file looked up when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "devpipe.toml";

/// Read and parse a project file without validating it.
///
/// Use [`load_and_validate`] to get a usable project.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let raw: RawProjectFile = toml::from_str(&contents)?;

    debug!(
        path = %path.display(),
        components = raw.component.len(),
        "parsed project file"
    );
    Ok(raw)
}

/// Read, parse and validate a project file.
///
/// Checks component names, attribute key names and value types; see
/// [`crate::config::validate`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(path)?;
    ProjectFile::try_from(raw)
}

/// `devpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
