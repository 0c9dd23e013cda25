//! Source fetching: staging raw files for a dataset.
//!
//! A [`FetchStrategy`] knows how to retrieve one kind of source (`url`,
//! `local`, ...). The [`FetchRegistry`] maps a config's `source_type` tag to
//! its strategy. Fetching is skipped for files that are already staged.

pub mod http;
pub mod local;

pub use http::UrlFetcher;
pub use local::LocalFetcher;

use crate::config::{Configuration, SourceSpec};
use crate::error::{HubError, Result};
use crate::staging::StagingArea;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Strategy for one `source_type`.
///
/// Implementations write the complete file to `dest` or leave nothing there.
/// The registry and staging layer sit above this trait; strategies don't know
/// about skip-if-present.
pub trait FetchStrategy: Send + Sync {
    /// Tag matched against `source_type`.
    fn source_type(&self) -> &'static str;

    /// Retrieve `source` into `dest`. Parent directories already exist.
    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()>;
}

/// Mapping from `source_type` tag to strategy.
#[derive(Default)]
pub struct FetchRegistry {
    strategies: BTreeMap<&'static str, Box<dyn FetchStrategy>>,
}

impl FetchRegistry {
    /// Registry with no strategies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `url` (blocking HTTP) and `local` (filesystem copy).
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::empty();
        registry.register(UrlFetcher::new()?);
        registry.register(LocalFetcher);
        Ok(registry)
    }

    /// Add a strategy, replacing any previously registered for the same tag.
    pub fn register(&mut self, strategy: impl FetchStrategy + 'static) -> &mut Self {
        self.strategies
            .insert(strategy.source_type(), Box::new(strategy));
        self
    }

    /// Registered tags, sorted.
    pub fn registered(&self) -> Vec<String> {
        self.strategies.keys().map(|k| k.to_string()).collect()
    }

    /// Strategy for a tag.
    pub fn get(&self, source_type: &str) -> Result<&dyn FetchStrategy> {
        self.strategies
            .get(source_type)
            .map(|s| s.as_ref())
            .ok_or_else(|| HubError::UnknownSourceType {
                source_type: source_type.to_string(),
                registered: self.registered(),
            })
    }
}

impl std::fmt::Debug for FetchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRegistry")
            .field("strategies", &self.registered())
            .finish()
    }
}

/// What a fetch pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    /// Files retrieved during this pass.
    pub fetched: Vec<PathBuf>,
    /// Files already staged, left untouched.
    pub skipped: Vec<PathBuf>,
}

impl FetchSummary {
    pub fn nothing_fetched(&self) -> bool {
        self.fetched.is_empty()
    }
}

/// Stage every source of `config`. Idempotent.
///
/// The first failure aborts the pass; files fetched before it stay staged.
pub fn fetch_sources(
    config: &Configuration,
    staging: &StagingArea,
    registry: &FetchRegistry,
) -> Result<FetchSummary> {
    let mut summary = FetchSummary::default();

    for source in &config.sources {
        let dest = staging.prepare_file_path(&config.dataset_name, &source.file)?;

        if dest.exists() {
            log::debug!("{} already staged, skipping", dest.display());
            summary.skipped.push(dest);
            continue;
        }

        let strategy = registry.get(&source.source_type)?;
        log::info!(
            "fetching {}/{} ({})",
            config.dataset_name,
            source.file,
            strategy.source_type()
        );
        strategy.fetch(source, &dest)?;
        summary.fetched.push(dest);
    }

    Ok(summary)
}
