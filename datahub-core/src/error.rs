//! Error taxonomy for the retrieval pipeline.
//!
//! Every stage returns [`HubError`]. Variants carry the offending path, URL or
//! type name plus the underlying cause, and [`HubError::kind`] folds them into
//! the coarse categories callers usually branch on.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout `datahub-core`.
pub type Result<T> = std::result::Result<T, HubError>;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration file missing, or unknown key in a result container.
    NotFound,
    /// Configuration document is malformed.
    Parse,
    /// Configuration is well-formed but semantically invalid.
    Configuration,
    /// Network or HTTP failure during fetch.
    Transport,
    /// Local filesystem failure while staging or transforming.
    Io,
    /// A staged file could not be parsed into a table.
    Table,
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("dataset config not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("table '{name}' not found (available: {})", available.join(", "))]
    TableNotFound { name: String, available: Vec<String> },

    #[error("failed to parse dataset config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid dataset config: {0}")]
    Configuration(String),

    #[error("unknown source type '{source_type}' (registered: {})", registered.join(", "))]
    UnknownSourceType {
        source_type: String,
        registered: Vec<String>,
    },

    #[error("unknown transform type '{transform_type}' (registered: {})", registered.join(", "))]
    UnknownTransformType {
        transform_type: String,
        registered: Vec<String>,
    },

    #[error("unsupported table format '{format}' (supported: {})", supported.join(", "))]
    UnsupportedFormat {
        format: String,
        supported: Vec<String>,
    },

    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read table '{table}' from {}: {source}", path.display())]
    TableRead {
        table: String,
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("failed to read workbook for table '{table}' from {}: {message}", path.display())]
    Workbook {
        table: String,
        path: PathBuf,
        message: String,
    },
}

impl HubError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HubError::ConfigNotFound { .. } | HubError::TableNotFound { .. } => ErrorKind::NotFound,
            HubError::Parse { .. } | HubError::SettingsParse { .. } => ErrorKind::Parse,
            HubError::Configuration(_)
            | HubError::UnknownSourceType { .. }
            | HubError::UnknownTransformType { .. }
            | HubError::UnsupportedFormat { .. } => ErrorKind::Configuration,
            HubError::Transport { .. } | HubError::HttpClient(_) => ErrorKind::Transport,
            HubError::Io { .. } | HubError::Archive { .. } => ErrorKind::Io,
            HubError::TableRead { .. } | HubError::Workbook { .. } => ErrorKind::Table,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HubError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        HubError::Configuration(message.into())
    }
}
