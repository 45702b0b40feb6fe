//! Run configuration.
//!
//! Loaded from an explicit `--config` path or `.fmerge.json` in the output
//! root; every field has a default so a run needs no config file at all.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = ".fmerge.json";
pub const DEFAULT_PROJECT_EXTENSION: &str = "csproj";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergerConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Raise on the first failed fragment instead of quarantining it.
    #[serde(default)]
    pub fail_on_error: bool,
    /// Extension, without the dot, of structural project files.
    #[serde(default = "default_project_extension")]
    pub project_extension: String,
    /// Command run with the project path after a project file is rewritten.
    #[serde(default)]
    pub refresh_command: Option<String>,
}

fn default_schema_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

fn default_project_extension() -> String {
    DEFAULT_PROJECT_EXTENSION.to_string()
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            fail_on_error: false,
            project_extension: default_project_extension(),
            refresh_command: None,
        }
    }
}

pub fn config_path(output_root: &Path) -> PathBuf {
    output_root.join(CONFIG_FILE_NAME)
}

pub fn load_config(path: &Path) -> Result<MergerConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: MergerConfig =
        serde_json::from_slice(&bytes).context("parse merge config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Explicit path if given, else the output root's config file, else defaults.
pub fn resolve_config(explicit: Option<&Path>, output_root: &Path) -> Result<MergerConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = config_path(output_root);
    if path.is_file() {
        return load_config(&path);
    }
    Ok(MergerConfig::default())
}

pub fn validate_config(config: &MergerConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported merge config schema_version {}",
            config.schema_version
        ));
    }
    let extension = config.project_extension.trim();
    if extension.is_empty() {
        return Err(anyhow!("project_extension must be non-empty"));
    }
    if extension.starts_with('.') {
        return Err(anyhow!(
            "project_extension must not start with '.' (got {extension:?})"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
