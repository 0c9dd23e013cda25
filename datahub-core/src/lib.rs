//! Datahub Core: declarative dataset retrieval.
//!
//! A dataset is identified by `(dataset_name, task_type)` and described by a
//! YAML config. Retrieval runs five stages:
//! - Config resolution (`config`)
//! - Source fetching into a local staging area (`sources`, `staging`)
//! - Raw transforms such as unzip and move (`transform`)
//! - Table loading through polars (`tables`)
//! - Per-table post-processing, ending in a [`DataBundle`]

pub mod bundle;
pub mod config;
pub mod datasets;
pub mod docs;
pub mod error;
pub mod pipeline;
pub mod settings;
pub mod sources;
pub mod staging;
pub mod tables;
pub mod transform;

pub use bundle::{DataBundle, DEFAULT_TABLE};
pub use error::{ErrorKind, HubError, Result};
pub use pipeline::Pipeline;
pub use settings::{load_settings, reset_options, set_option, RuntimeSettings};

/// Retrieve a bundled dataset using the session settings.
///
/// `verbose` overrides the `verbose` setting for the documentation-link hook.
pub fn get_data(dataset_name: &str, task_type: &str, verbose: Option<bool>) -> Result<DataBundle> {
    let settings = load_settings();
    let bundle = Pipeline::new(&settings)?.run(dataset_name, task_type)?;
    docs::log_dataset_doc_link(dataset_name, task_type, verbose.unwrap_or(settings.verbose));
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the registries and the pipeline can move across
    /// threads, so a host can build one per worker.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Pipeline>();
        require_sync::<Pipeline>();
        require_send::<sources::FetchRegistry>();
        require_sync::<sources::FetchRegistry>();
        require_send::<transform::TransformRegistry>();
        require_sync::<transform::TransformRegistry>();
        require_send::<DataBundle>();
        require_sync::<DataBundle>();
        require_send::<config::Configuration>();
        require_sync::<config::Configuration>();
        require_send::<HubError>();
        require_sync::<HubError>();
    }

    #[test]
    fn unknown_dataset_is_not_found() {
        let err = get_data("no_such_dataset", "classification", Some(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("no_such_dataset.yaml"));
    }
}
