// src/config/mod.rs

//! Project-file loading and validation for devpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Turn the raw file into a validated project (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ProjectFile, RawProjectFile, SettingsSection};
