//! Parquet reader.
//!
//! `read_params`: `columns` (`usecols`), `n_rows` (`nrows`).

use super::{decode_params, project, TableFormat};
use crate::config::Params;
use crate::error::{HubError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ParquetParams {
    #[serde(alias = "usecols")]
    columns: Option<Vec<String>>,
    #[serde(alias = "nrows")]
    n_rows: Option<usize>,
}

pub fn read(table: &str, path: &Path, params: &Params) -> Result<DataFrame> {
    let p: ParquetParams = decode_params(params, table, TableFormat::Parquet)?;
    let file = File::open(path).map_err(|e| HubError::io(path, e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|source| HubError::TableRead {
            table: table.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
    project(df, p.columns, p.n_rows, table, path)
}
