//! Dataset configuration: schema and resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{bundled_config_root, ConfigResolver, CONFIGS_DIR};
pub use schema::{Configuration, Params, SourceSpec, TableSpec, TransformSpec};

/// Resolve a dataset config from the bundled catalog.
pub fn resolve(dataset_name: &str, task_type: &str) -> crate::Result<Configuration> {
    ConfigResolver::bundled().resolve(dataset_name, task_type)
}
