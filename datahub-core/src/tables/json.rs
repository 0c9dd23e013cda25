//! JSON reader: an array of records, or newline-delimited records.
//!
//! `read_params`: `lines` (newline-delimited, defaults to true for `.jsonl`
//! and `.ndjson`), `columns` (`usecols`), `n_rows` (`nrows`),
//! `infer_schema_length`.

use super::{decode_params, project, TableFormat};
use crate::config::Params;
use crate::error::{HubError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JsonParams {
    lines: Option<bool>,
    #[serde(alias = "usecols")]
    columns: Option<Vec<String>>,
    #[serde(alias = "nrows")]
    n_rows: Option<usize>,
    infer_schema_length: Option<usize>,
}

fn lines_by_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| e == "jsonl" || e == "ndjson")
}

pub fn read(table: &str, path: &Path, params: &Params) -> Result<DataFrame> {
    let p: JsonParams = decode_params(params, table, TableFormat::Json)?;
    let format = if p.lines.unwrap_or_else(|| lines_by_extension(path)) {
        JsonFormat::JsonLines
    } else {
        JsonFormat::Json
    };
    let infer_len = NonZeroUsize::new(p.infer_schema_length.unwrap_or(100));

    let file = File::open(path).map_err(|e| HubError::io(path, e))?;
    let df = JsonReader::new(file)
        .with_json_format(format)
        .infer_schema_len(infer_len)
        .finish()
        .map_err(|source| HubError::TableRead {
            table: table.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
    project(df, p.columns, p.n_rows, table, path)
}
