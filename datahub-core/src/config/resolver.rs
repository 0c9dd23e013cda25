//! Locating and loading dataset configurations.
//!
//! Layout: `{root}/{task_type}/_configs/{dataset_name}.yaml`

use super::schema::{parse_document, Configuration};
use crate::error::{HubError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under each task type that holds dataset configs.
pub const CONFIGS_DIR: &str = "_configs";

/// Extension of dataset config files.
pub const CONFIG_EXTENSION: &str = "yaml";

/// Root of the configs shipped with this crate.
///
/// This is the crate's source directory at build time, so a binary moved to
/// another machine must point `--config-root` (or `DATAHUB_CONFIG_ROOT`) at a
/// copy of the catalog.
pub fn bundled_config_root() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/datasets"))
}

/// Maps `(dataset_name, task_type)` to a normalized [`Configuration`].
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    root: PathBuf,
}

impl ConfigResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver over the bundled dataset catalog.
    pub fn bundled() -> Self {
        Self::new(bundled_config_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the config for a dataset. Does not check existence.
    pub fn config_path(&self, dataset_name: &str, task_type: &str) -> Result<PathBuf> {
        check_segment("task_type", task_type)?;
        check_segment("dataset_name", dataset_name)?;
        Ok(self
            .root
            .join(task_type)
            .join(CONFIGS_DIR)
            .join(format!("{dataset_name}.{CONFIG_EXTENSION}")))
    }

    /// Locate, parse and normalize the config for a dataset.
    pub fn resolve(&self, dataset_name: &str, task_type: &str) -> Result<Configuration> {
        let path = self.config_path(dataset_name, task_type)?;
        if !path.is_file() {
            return Err(HubError::ConfigNotFound { path });
        }
        let bytes = fs::read(&path).map_err(|e| HubError::io(&path, e))?;
        let config = parse_document(&bytes, &path)?.validate()?;
        if config.dataset_name != dataset_name {
            log::warn!(
                "config {} declares dataset_name '{}'; staging under that name",
                path.display(),
                config.dataset_name
            );
        }
        Ok(config)
    }

    /// Dataset names available for a task type, sorted.
    pub fn list_datasets(&self, task_type: &str) -> Result<Vec<String>> {
        check_segment("task_type", task_type)?;
        let dir = self.root.join(task_type).join(CONFIGS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| HubError::io(&dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| HubError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Task types under the root that contain a `_configs` directory, sorted.
    pub fn list_task_types(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.root).map_err(|e| HubError::io(&self.root, e))?;

        let mut tasks = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| HubError::io(&self.root, e))?.path();
            if !path.join(CONFIGS_DIR).is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                tasks.push(name.to_string());
            }
        }
        tasks.sort();
        Ok(tasks)
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Names become single path segments; reject anything that would not.
fn check_segment(what: &str, value: &str) -> Result<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\');
    if bad {
        return Err(HubError::config(format!("invalid {what} '{value}'")));
    }
    Ok(())
}
