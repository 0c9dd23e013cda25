//! Spreadsheet reader (xlsx, xls, xlsm, ods) via calamine.
//!
//! `read_params`: `sheet_name` (`sheet`; name or zero-based index, default
//! the first sheet), `has_header` (default true), `skip_rows` (`skiprows`),
//! `n_rows` (`nrows`), `columns` (`usecols`).
//!
//! Column dtypes are inferred from the cells: all integers → i64, any mix of
//! numbers → f64, all booleans → bool, anything else → string. Empty cells
//! are null.

use super::{decode_params, project, TableFormat};
use crate::config::Params;
use crate::error::{HubError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum SheetSelector {
    Index(usize),
    Name(String),
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{i}"),
            SheetSelector::Name(name) => write!(f, "'{name}'"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExcelParams {
    #[serde(alias = "sheet")]
    sheet_name: Option<SheetSelector>,
    has_header: Option<bool>,
    #[serde(alias = "skiprows")]
    skip_rows: Option<usize>,
    #[serde(alias = "nrows")]
    n_rows: Option<usize>,
    #[serde(alias = "usecols")]
    columns: Option<Vec<String>>,
}

pub fn read(table: &str, path: &Path, params: &Params) -> Result<DataFrame> {
    let p: ExcelParams = decode_params(params, table, TableFormat::Excel)?;
    let workbook_err = |message: String| HubError::Workbook {
        table: table.to_string(),
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let sheets = workbook.sheet_names();
    let sheet = match &p.sheet_name {
        None => sheets.first().cloned(),
        Some(SheetSelector::Index(i)) => sheets.get(*i).cloned(),
        Some(SheetSelector::Name(name)) => sheets.iter().find(|s| *s == name).cloned(),
    }
    .ok_or_else(|| {
        let wanted = p
            .sheet_name
            .as_ref()
            .map_or_else(|| "#0".to_string(), |s| s.to_string());
        workbook_err(format!(
            "sheet {wanted} not found (available: {})",
            sheets.join(", ")
        ))
    })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| workbook_err(e.to_string()))?;
    let rows: Vec<&[Data]> = range.rows().skip(p.skip_rows.unwrap_or(0)).collect();

    let df = frame_from_rows(&rows, p.has_header.unwrap_or(true)).map_err(|source| {
        HubError::TableRead {
            table: table.to_string(),
            path: path.to_path_buf(),
            source,
        }
    })?;
    project(df, p.columns, p.n_rows, table, path)
}

// ── Cell conversion ─────────────────────────────────────────────────

static EMPTY_CELL: Data = Data::Empty;

fn header_name(cell: Option<&Data>, index: usize) -> String {
    match cell {
        None | Some(Data::Empty) => format!("column_{}", index + 1),
        Some(c) => c.to_string(),
    }
}

fn build_column(name: String, cells: &[&Data]) -> Column {
    let present = || cells.iter().filter(|c| !matches!(c, Data::Empty));
    let name = PlSmallStr::from(name);

    if present().next().is_some() && present().all(|c| matches!(c, Data::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }
    if present().next().is_some()
        && present().all(|c| matches!(c, Data::Int(_) | Data::Float(_)))
    {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }
    if present().next().is_some() && present().all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Column::new(name, values);
    }
    let values: Vec<Option<String>> = cells
        .iter()
        .map(|c| match c {
            Data::Empty => None,
            other => Some(other.to_string()),
        })
        .collect();
    Column::new(name, values)
}

/// Turn spreadsheet rows into a DataFrame. Short rows are padded with nulls.
fn frame_from_rows(rows: &[&[Data]], has_header: bool) -> PolarsResult<DataFrame> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let (header, body) = match rows.split_first() {
        Some((first, rest)) if has_header => (Some(*first), rest),
        _ => (None, rows),
    };

    let columns = (0..width)
        .map(|j| {
            let name = match header {
                Some(h) => header_name(h.get(j), j),
                None => format!("column_{}", j + 1),
            };
            let cells: Vec<&Data> = body
                .iter()
                .map(|r| r.get(j).unwrap_or(&EMPTY_CELL))
                .collect();
            build_column(name, &cells)
        })
        .collect();
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn s(v: &str) -> Data {
        Data::String(v.into())
    }

    #[test]
    fn header_row_names_columns_and_dtypes_are_inferred() {
        let rows = [
            vec![s("id"), s("score"), s("name"), s("active")],
            vec![Data::Int(1), Data::Float(0.5), s("a"), Data::Bool(true)],
            vec![Data::Int(2), Data::Int(3), Data::Empty, Data::Bool(false)],
        ];
        let refs: Vec<&[Data]> = rows.iter().map(|r| r.as_slice()).collect();
        let df = frame_from_rows(&refs, true).unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
        assert_eq!(df.column("active").unwrap().dtype(), &DataType::Boolean);
    }

    #[test]
    fn without_header_columns_are_numbered_and_short_rows_padded() {
        let rows = [vec![Data::Int(1), Data::Int(2)], vec![Data::Int(3)]];
        let refs: Vec<&[Data]> = rows.iter().map(|r| r.as_slice()).collect();
        let df = frame_from_rows(&refs, false).unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("column_2").unwrap().null_count(), 1);
    }

    #[test]
    fn empty_sheet_is_empty_frame() {
        let df = frame_from_rows(&[], true).unwrap();
        assert_eq!(df.shape(), (0, 0));
    }

    #[test]
    fn non_workbook_file_is_table_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, "not a spreadsheet").unwrap();
        let err = read("data", &path, &Params::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Table);
        assert!(err.to_string().contains("book.xlsx"));
    }

    #[test]
    fn sheet_selector_accepts_index_or_name() {
        let p: ExcelParams = serde_yaml::from_str("{sheet_name: 1}").unwrap();
        assert_eq!(p.sheet_name, Some(SheetSelector::Index(1)));
        let p: ExcelParams = serde_yaml::from_str("{sheet: Summary}").unwrap();
        assert_eq!(p.sheet_name, Some(SheetSelector::Name("Summary".into())));
    }
}
