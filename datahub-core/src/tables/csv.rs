//! Delimited text reader.
//!
//! `read_params` keys (pandas spellings in parentheses):
//!
//! | key                   | meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `separator` (`sep`, `delimiter`) | single-byte field separator    |
//! | `has_header`          | first row holds column names (default true) |
//! | `skip_rows` (`skiprows`) | rows to skip before the header         |
//! | `n_rows` (`nrows`)    | read at most this many rows               |
//! | `columns` (`usecols`) | keep only these columns                   |
//! | `null_values` (`na_values`) | string(s) read as null              |
//! | `quote_char` (`quotechar`) | quote byte, `""` disables quoting    |
//! | `decimal`             | `"."` (default) or `","`                  |
//! | `try_parse_dates` (`parse_dates`) | parse date-like columns       |
//! | `infer_schema_length` | rows sampled for dtype inference          |
//! | `ignore_errors`       | keep going on unparsable values           |
//!
//! `.tsv` files default to a tab separator.

use super::{decode_params, OneOrMany, TableFormat};
use crate::config::Params;
use crate::error::{HubError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CsvParams {
    #[serde(alias = "sep", alias = "delimiter")]
    separator: Option<String>,
    has_header: Option<bool>,
    #[serde(alias = "skiprows")]
    skip_rows: Option<usize>,
    #[serde(alias = "nrows")]
    n_rows: Option<usize>,
    #[serde(alias = "usecols")]
    columns: Option<Vec<String>>,
    #[serde(alias = "na_values")]
    null_values: Option<OneOrMany>,
    #[serde(alias = "quotechar")]
    quote_char: Option<String>,
    decimal: Option<String>,
    #[serde(alias = "parse_dates")]
    try_parse_dates: Option<bool>,
    infer_schema_length: Option<usize>,
    ignore_errors: Option<bool>,
}

fn single_byte(value: &str, key: &str, table: &str) -> Result<u8> {
    match value.as_bytes() {
        [b] => Ok(*b),
        _ => Err(HubError::config(format!(
            "read_params of table '{table}' (csv): '{key}' must be a single byte, got {value:?}"
        ))),
    }
}

fn default_separator(path: &Path) -> u8 {
    let is_tsv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        b'\t'
    } else {
        b','
    }
}

pub fn read(table: &str, path: &Path, params: &Params) -> Result<DataFrame> {
    let p: CsvParams = decode_params(params, table, TableFormat::Csv)?;

    let separator = match &p.separator {
        Some(s) => single_byte(s, "separator", table)?,
        None => default_separator(path),
    };
    let quote_char = match p.quote_char.as_deref() {
        None => Some(b'"'),
        Some("") => None,
        Some(q) => Some(single_byte(q, "quote_char", table)?),
    };
    let decimal_comma = match p.decimal.as_deref() {
        None | Some(".") => false,
        Some(",") => true,
        Some(other) => {
            return Err(HubError::config(format!(
                "read_params of table '{table}' (csv): unsupported decimal {other:?}"
            )))
        }
    };
    let null_values = p.null_values.map(|nv| {
        NullValues::AllColumns(nv.into_vec().into_iter().map(PlSmallStr::from).collect())
    });
    let columns: Option<Arc<[PlSmallStr]>> = p
        .columns
        .map(|cols| cols.into_iter().map(PlSmallStr::from).collect());
    let try_parse_dates = p.try_parse_dates.unwrap_or(false);

    let table_err = |source| HubError::TableRead {
        table: table.to_string(),
        path: path.to_path_buf(),
        source,
    };

    CsvReadOptions::default()
        .with_has_header(p.has_header.unwrap_or(true))
        .with_skip_rows(p.skip_rows.unwrap_or(0))
        .with_n_rows(p.n_rows)
        .with_columns(columns)
        .with_infer_schema_length(Some(p.infer_schema_length.unwrap_or(100)))
        .with_ignore_errors(p.ignore_errors.unwrap_or(false))
        .map_parse_options(|opts| {
            opts.with_separator(separator)
                .with_quote_char(quote_char)
                .with_null_values(null_values.clone())
                .with_decimal_comma(decimal_comma)
                .with_try_parse_dates(try_parse_dates)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(table_err)?
        .finish()
        .map_err(table_err)
}
