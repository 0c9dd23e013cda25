//! Process-wide runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML settings
//! file, then session overrides written through [`set_option`]. Pipeline
//! stages never read the global state directly; the caller resolves a
//! [`RuntimeSettings`] value once and hands it to the pipeline.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Root of the staging area. Datasets land in `{data_path}/{dataset_name}/`.
    pub data_path: PathBuf,
    /// Log a documentation link after each successful load.
    pub verbose: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            verbose: true,
        }
    }
}

/// `<platform cache dir>/datahub`, or `./data` when the platform has none.
pub fn default_data_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("datahub"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Partial settings as written in a TOML file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    data_path: Option<PathBuf>,
    verbose: Option<bool>,
}

impl RuntimeSettings {
    /// Read a TOML settings file and overlay it on the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| HubError::io(path, e))?;
        Self::from_toml_str(&content).map_err(|source| HubError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let file: SettingsFile = toml::from_str(content)?;
        let mut settings = Self::default();
        if let Some(data_path) = file.data_path {
            settings.data_path = data_path;
        }
        if let Some(verbose) = file.verbose {
            settings.verbose = verbose;
        }
        Ok(settings)
    }

    /// Apply session overrides on top of `self`.
    fn overlay(mut self, overrides: &Overrides) -> Self {
        if let Some(data_path) = &overrides.data_path {
            self.data_path = data_path.clone();
        }
        if let Some(verbose) = overrides.verbose {
            self.verbose = verbose;
        }
        self
    }
}

// ── Session overrides ───────────────────────────────────────────────

/// Keys accepted by [`set_option`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DataPath,
    Verbose,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::DataPath, SettingKey::Verbose];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::DataPath => "data_path",
            SettingKey::Verbose => "verbose",
        }
    }
}

impl std::str::FromStr for SettingKey {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
                HubError::config(format!(
                    "unknown setting '{s}' (known: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Value passed to [`set_option`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Path(PathBuf),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        OptionValue::Path(value)
    }
}

impl From<&Path> for OptionValue {
    fn from(value: &Path) -> Self {
        OptionValue::Path(value.to_path_buf())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Path(PathBuf::from(value))
    }
}

#[derive(Debug, Default)]
struct Overrides {
    data_path: Option<PathBuf>,
    verbose: Option<bool>,
}

static OVERRIDES: RwLock<Overrides> = RwLock::new(Overrides {
    data_path: None,
    verbose: None,
});

/// Override a runtime setting for the rest of the process.
///
/// `data_path` takes a path, `verbose` takes a bool. Unknown keys and
/// mismatched value types are rejected.
pub fn set_option(key: &str, value: impl Into<OptionValue>) -> Result<()> {
    let key: SettingKey = key.parse()?;
    let value = value.into();
    let mut overrides = OVERRIDES.write().unwrap_or_else(PoisonError::into_inner);
    match (key, value) {
        (SettingKey::DataPath, OptionValue::Path(path)) => overrides.data_path = Some(path),
        (SettingKey::Verbose, OptionValue::Bool(flag)) => overrides.verbose = Some(flag),
        (key, value) => {
            return Err(HubError::config(format!(
                "setting '{}' does not accept {value:?}",
                key.as_str()
            )))
        }
    }
    Ok(())
}

/// Drop every session override.
pub fn reset_options() {
    let mut overrides = OVERRIDES.write().unwrap_or_else(PoisonError::into_inner);
    *overrides = Overrides::default();
}

/// Defaults merged with session overrides.
pub fn load_settings() -> RuntimeSettings {
    load_settings_over(RuntimeSettings::default())
}

/// `base` merged with session overrides.
pub fn load_settings_over(base: RuntimeSettings) -> RuntimeSettings {
    let overrides = OVERRIDES.read().unwrap_or_else(PoisonError::into_inner);
    base.overlay(&overrides)
}
