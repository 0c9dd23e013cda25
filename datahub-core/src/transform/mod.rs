//! Raw transforms: post-fetch filesystem operations on staged files.
//!
//! Transforms run in declaration order against the dataset's staging
//! directory. Parameter paths are relative to that directory.

pub mod move_files;
pub mod unzip;

pub use move_files::MoveFiles;
pub use unzip::Unzip;

use crate::config::{Configuration, Params};
use crate::error::{HubError, Result};
use crate::staging::{staged_dir, staged_relative, StagingArea};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One `transform_type`.
pub trait RawTransform: Send + Sync {
    /// Tag matched against `transform_type`.
    fn transform_type(&self) -> &'static str;

    /// Apply to the files under `dataset_dir`.
    fn apply(&self, params: &Params, dataset_dir: &Path) -> Result<()>;
}

/// Mapping from `transform_type` tag to transform.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<&'static str, Box<dyn RawTransform>>,
}

impl TransformRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `unzip` and `move`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Unzip).register(MoveFiles);
        registry
    }

    pub fn register(&mut self, transform: impl RawTransform + 'static) -> &mut Self {
        self.transforms
            .insert(transform.transform_type(), Box::new(transform));
        self
    }

    pub fn registered(&self) -> Vec<String> {
        self.transforms.keys().map(|k| k.to_string()).collect()
    }

    pub fn get(&self, transform_type: &str) -> Result<&dyn RawTransform> {
        self.transforms
            .get(transform_type)
            .map(|t| t.as_ref())
            .ok_or_else(|| HubError::UnknownTransformType {
                transform_type: transform_type.to_string(),
                registered: self.registered(),
            })
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.registered())
            .finish()
    }
}

/// Run every `source_transform` entry of `config`, in order.
///
/// Stops at the first failure. Files produced by earlier transforms stay.
pub fn transform_sources(
    config: &Configuration,
    staging: &StagingArea,
    registry: &TransformRegistry,
) -> Result<()> {
    let dataset_dir = staging.dataset_dir(&config.dataset_name);
    for (i, spec) in config.source_transform.iter().enumerate() {
        let transform = registry.get(&spec.transform_type)?;
        log::debug!(
            "{}: source_transform[{i}] {}",
            config.dataset_name,
            spec.transform_type
        );
        transform.apply(&spec.transform_params, &dataset_dir)?;
    }
    Ok(())
}

/// Resolve a path-valued parameter against the dataset directory.
pub(crate) fn param_path(
    params: &Params,
    key: &str,
    transform_type: &str,
    dataset_dir: &Path,
) -> Result<PathBuf> {
    let context = format!("{transform_type} transform");
    let value = crate::config::schema::param_str(params, key, &context)?;
    Ok(dataset_dir.join(staged_relative(value)?))
}

/// Resolve a directory-valued parameter against the dataset directory.
/// `.` resolves to the dataset directory itself.
pub(crate) fn param_dir(
    params: &Params,
    key: &str,
    transform_type: &str,
    dataset_dir: &Path,
) -> Result<PathBuf> {
    let context = format!("{transform_type} transform");
    let value = crate::config::schema::param_str(params, key, &context)?;
    let relative = staged_dir(value)?;
    if relative.as_os_str().is_empty() {
        return Ok(dataset_dir.to_path_buf());
    }
    Ok(dataset_dir.join(relative))
}
