//! The retrieval pipeline: resolve → fetch → raw transform → load → table
//! transform.
//!
//! A [`Pipeline`] owns every collaborator it needs, built from an explicit
//! [`RuntimeSettings`] value. Nothing in here reads process-wide state.

use crate::bundle::DataBundle;
use crate::config::{ConfigResolver, Configuration};
use crate::error::Result;
use crate::settings::RuntimeSettings;
use crate::sources::{fetch_sources, FetchRegistry, FetchSummary};
use crate::staging::StagingArea;
use crate::tables::{load_tables, transform_tables, Identity, TableTransform};
use crate::transform::{transform_sources, TransformRegistry};

pub struct Pipeline {
    resolver: ConfigResolver,
    staging: StagingArea,
    fetchers: FetchRegistry,
    transforms: TransformRegistry,
    table_transform: Box<dyn TableTransform>,
}

impl Pipeline {
    /// Pipeline over the bundled catalog, staging under `settings.data_path`,
    /// with the default fetch strategies and raw transforms.
    pub fn new(settings: &RuntimeSettings) -> Result<Self> {
        Ok(Self {
            resolver: ConfigResolver::bundled(),
            staging: StagingArea::new(&settings.data_path),
            fetchers: FetchRegistry::with_defaults()?,
            transforms: TransformRegistry::with_defaults(),
            table_transform: Box::new(Identity),
        })
    }

    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_fetchers(mut self, fetchers: FetchRegistry) -> Self {
        self.fetchers = fetchers;
        self
    }

    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_table_transform(mut self, transform: impl TableTransform + 'static) -> Self {
        self.table_transform = Box::new(transform);
        self
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn resolve(&self, dataset_name: &str, task_type: &str) -> Result<Configuration> {
        self.resolver.resolve(dataset_name, task_type)
    }

    /// Fetch missing sources, then run the raw transforms in order.
    pub fn stage(&self, config: &Configuration) -> Result<FetchSummary> {
        let summary = fetch_sources(config, &self.staging, &self.fetchers)?;
        transform_sources(config, &self.staging, &self.transforms)?;
        Ok(summary)
    }

    /// Read the staged tables and apply the table transform.
    pub fn load(&self, config: &Configuration) -> Result<DataBundle> {
        let tables = load_tables(config, &self.staging)?;
        transform_tables(tables, self.table_transform.as_ref())
    }

    /// The whole pipeline for one dataset.
    pub fn run(&self, dataset_name: &str, task_type: &str) -> Result<DataBundle> {
        let config = self.resolve(dataset_name, task_type)?;
        let summary = self.stage(&config)?;
        log::debug!(
            "{dataset_name}: {} fetched, {} already staged",
            summary.fetched.len(),
            summary.skipped.len()
        );
        self.load(&config)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("resolver", &self.resolver)
            .field("staging", &self.staging)
            .field("fetchers", &self.fetchers)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}
