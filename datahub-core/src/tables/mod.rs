//! Table loading: staged files → named DataFrames.
//!
//! Each [`TableSpec`] is read with the reader for its [`TableFormat`]
//! (explicit `format`, else inferred from the file extension). `read_params`
//! are decoded by that reader into its own typed parameter set; unknown keys
//! are configuration errors.

pub mod csv;
pub mod excel;
pub mod json;
pub mod parquet;
pub mod transform;

pub use transform::{transform_tables, Identity, TableTransform};

use crate::bundle::DataBundle;
use crate::config::{Configuration, Params, TableSpec};
use crate::error::{HubError, Result};
use crate::staging::StagingArea;
use polars::prelude::DataFrame;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::Path;

// ── Formats ─────────────────────────────────────────────────────────

/// Reader selected for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    Csv,
    Parquet,
    Excel,
    Json,
}

impl TableFormat {
    pub const ALL: [TableFormat; 4] = [
        TableFormat::Csv,
        TableFormat::Parquet,
        TableFormat::Excel,
        TableFormat::Json,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
            TableFormat::Excel => "excel",
            TableFormat::Json => "json",
        }
    }

    fn supported() -> Vec<String> {
        Self::ALL.iter().map(|f| f.name().to_string()).collect()
    }

    /// Parse an explicit `format:` value. Case-insensitive.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| HubError::UnsupportedFormat {
                format: name.to_string(),
                supported: Self::supported(),
            })
    }

    /// Infer from a file name's extension.
    pub fn infer(file: &str) -> Result<Self> {
        let ext = Path::new(file)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let format = match ext.as_str() {
            "csv" | "tsv" | "txt" => TableFormat::Csv,
            "parquet" | "pq" => TableFormat::Parquet,
            "xlsx" | "xls" | "xlsm" | "ods" => TableFormat::Excel,
            "json" | "jsonl" | "ndjson" => TableFormat::Json,
            _ => {
                return Err(HubError::UnsupportedFormat {
                    format: if ext.is_empty() {
                        file.to_string()
                    } else {
                        ext
                    },
                    supported: Self::supported(),
                })
            }
        };
        Ok(format)
    }

    /// Format for a table spec: explicit `format` wins over the extension.
    pub fn for_table(spec: &TableSpec) -> Result<Self> {
        match &spec.format {
            Some(name) => Self::from_name(name),
            None => Self::infer(&spec.file),
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Read every table of `config` from the staging area, in declaration order.
pub fn load_tables(config: &Configuration, staging: &StagingArea) -> Result<DataBundle> {
    let mut bundle = DataBundle::new();
    for spec in &config.tables {
        let path = staging.file_path(&config.dataset_name, &spec.file)?;
        let df = load_table(spec, &path)?;
        log::debug!(
            "{}: loaded table '{}' {:?} from {}",
            config.dataset_name,
            spec.name,
            df.shape(),
            path.display()
        );
        bundle.insert(spec.name.clone(), df)?;
    }
    Ok(bundle)
}

/// Read one table from `path`.
pub fn load_table(spec: &TableSpec, path: &Path) -> Result<DataFrame> {
    let format = TableFormat::for_table(spec)?;
    if !path.is_file() {
        return Err(HubError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "staged file is missing"),
        ));
    }
    match format {
        TableFormat::Csv => csv::read(&spec.name, path, &spec.read_params),
        TableFormat::Parquet => parquet::read(&spec.name, path, &spec.read_params),
        TableFormat::Excel => excel::read(&spec.name, path, &spec.read_params),
        TableFormat::Json => json::read(&spec.name, path, &spec.read_params),
    }
}

// ── Shared reader helpers ───────────────────────────────────────────

/// Decode `read_params` into a reader's typed parameter struct.
pub(crate) fn decode_params<T: DeserializeOwned>(
    params: &Params,
    table: &str,
    format: TableFormat,
) -> Result<T> {
    serde_yaml::from_value(serde_yaml::Value::Mapping(params.clone())).map_err(|e| {
        HubError::config(format!("read_params of table '{table}' ({format}): {e}"))
    })
}

/// A scalar or a list, as pandas accepts for `na_values` and friends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Keep `columns` (in the given order) and the first `n_rows` rows.
pub(crate) fn project(
    df: DataFrame,
    columns: Option<Vec<String>>,
    n_rows: Option<usize>,
    table: &str,
    path: &Path,
) -> Result<DataFrame> {
    let df = match columns {
        Some(cols) => df.select(cols).map_err(|source| HubError::TableRead {
            table: table.to_string(),
            path: path.to_path_buf(),
            source,
        })?,
        None => df,
    };
    Ok(match n_rows {
        Some(n) => df.head(Some(n)),
        None => df,
    })
}
