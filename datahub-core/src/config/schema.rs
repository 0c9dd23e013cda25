//! Dataset configuration schema.
//!
//! Parsing happens in two steps. [`RawConfig`] mirrors the YAML document
//! loosely (everything optional) so that syntax errors and shape errors are
//! reported as parse failures. [`RawConfig::validate`] then applies defaults
//! and the semantic checks, producing the [`Configuration`] the later stages
//! consume.

use crate::error::{HubError, Result};
use crate::staging::{staged_dir, staged_relative};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Free-form parameters forwarded to a fetch strategy, transform or reader.
pub type Params = serde_yaml::Mapping;

/// Normalized dataset configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub dataset_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sources: Vec<SourceSpec>,
    pub source_transform: Vec<TransformSpec>,
    pub tables: Vec<TableSpec>,
}

/// Where one staged file comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSpec {
    /// Destination filename, relative to the dataset's staging directory.
    pub file: String,
    /// Fetch strategy discriminator, e.g. `url`.
    pub source_type: String,
    /// Strategy-specific data, e.g. `{url: ...}`.
    pub source_info: Params,
}

/// One post-fetch transformation, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformSpec {
    pub transform_type: String,
    pub transform_params: Params,
}

/// One table of the loaded result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSpec {
    /// Key in the result container.
    pub name: String,
    /// Staged file to read, relative to the dataset's staging directory.
    pub file: String,
    /// Explicit reader format. Inferred from the file extension when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Forwarded verbatim to the reader.
    pub read_params: Params,
}

impl Configuration {
    /// Table names in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

// ── Raw document ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub dataset_name: Option<String>,
    pub description: Option<String>,
    pub sources: Option<Vec<RawSource>>,
    pub source_transform: Option<Vec<RawTransform>>,
    pub tables: Option<Vec<RawTable>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSource {
    pub file: Option<String>,
    pub source_type: Option<String>,
    pub source_info: Option<Params>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTransform {
    pub transform_type: Option<String>,
    pub transform_params: Option<Params>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTable {
    pub name: Option<String>,
    pub file: Option<String>,
    pub format: Option<String>,
    pub read_params: Option<Params>,
}

/// Parse a YAML document. `path` is only used for error reporting; input
/// that is not valid UTF-8 is a parse error like any other malformed YAML.
pub fn parse_document(bytes: impl AsRef<[u8]>, path: &Path) -> Result<RawConfig> {
    serde_yaml::from_slice(bytes.as_ref()).map_err(|source| HubError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Fetch a required string parameter, naming `context` when it is missing.
pub fn param_str<'a>(params: &'a Params, key: &str, context: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(serde_yaml::Value::as_str)
        .ok_or_else(|| HubError::config(format!("{context}: missing string parameter '{key}'")))
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(HubError::config(format!("missing required field '{what}'"))),
    }
}

impl RawConfig {
    /// Apply defaults and semantic checks.
    pub fn validate(self) -> Result<Configuration> {
        let dataset_name = required(self.dataset_name, "dataset_name")?;
        staged_relative(&dataset_name)
            .map_err(|_| HubError::config(format!("invalid dataset_name '{dataset_name}'")))?;

        let raw_sources = self
            .sources
            .filter(|s| !s.is_empty())
            .ok_or_else(|| HubError::config("'sources' must be a non-empty list"))?;
        let raw_tables = self
            .tables
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HubError::config("'tables' must be a non-empty list"))?;

        let mut sources = Vec::with_capacity(raw_sources.len());
        let mut seen_files = HashSet::new();
        for (i, raw) in raw_sources.into_iter().enumerate() {
            let file = required(raw.file, &format!("sources[{i}].file"))?;
            staged_relative(&file)?;
            if !seen_files.insert(file.clone()) {
                return Err(HubError::config(format!(
                    "duplicate source file '{file}'"
                )));
            }
            sources.push(SourceSpec {
                file,
                source_type: required(raw.source_type, &format!("sources[{i}].source_type"))?,
                source_info: raw.source_info.unwrap_or_default(),
            });
        }

        let mut source_transform = Vec::new();
        for (i, raw) in self.source_transform.unwrap_or_default().into_iter().enumerate() {
            source_transform.push(TransformSpec {
                transform_type: required(
                    raw.transform_type,
                    &format!("source_transform[{i}].transform_type"),
                )?,
                transform_params: raw.transform_params.unwrap_or_default(),
            });
        }

        let mut tables = Vec::with_capacity(raw_tables.len());
        let mut seen_names = HashSet::new();
        for (i, raw) in raw_tables.into_iter().enumerate() {
            let name = required(raw.name, &format!("tables[{i}].name"))?;
            if !seen_names.insert(name.clone()) {
                return Err(HubError::config(format!("duplicate table name '{name}'")));
            }
            let file = required(raw.file, &format!("tables[{i}].file"))?;
            staged_relative(&file)?;
            tables.push(TableSpec {
                name,
                file,
                format: raw.format,
                read_params: raw.read_params.unwrap_or_default(),
            });
        }

        let config = Configuration {
            dataset_name,
            description: self.description,
            sources,
            source_transform,
            tables,
        };
        check_tables_are_produced(&config)?;
        Ok(config)
    }
}

/// Every table must read a file that some source writes, either directly or
/// under the `target_dir` of a transform. Transforms without a `target_dir`
/// can produce arbitrary files, so their presence disables the check. A
/// `target_dir` of `.` covers every table file.
fn check_tables_are_produced(config: &Configuration) -> Result<()> {
    let mut target_dirs: Vec<PathBuf> = Vec::new();
    for transform in &config.source_transform {
        match transform
            .transform_params
            .get("target_dir")
            .and_then(serde_yaml::Value::as_str)
        {
            Some(dir) => target_dirs.push(staged_dir(dir)?),
            None => return Ok(()),
        }
    }

    for table in &config.tables {
        let file = Path::new(&table.file);
        let direct = config.sources.iter().any(|s| Path::new(&s.file) == file);
        let derived = target_dirs
            .iter()
            .any(|dir| dir.as_os_str().is_empty() || file.starts_with(dir));
        if !direct && !derived {
            return Err(HubError::config(format!(
                "table '{}' reads '{}', which no source or transform produces",
                table.name, table.file
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(yaml: &str) -> Result<Configuration> {
        parse_document(yaml, Path::new("test.yaml"))?.validate()
    }

    const IRIS: &str = r#"
dataset_name: iris
sources:
  - file: iris.csv
    source_type: url
    source_info:
      url: https://example.com/iris.csv
tables:
  - name: data
    file: iris.csv
"#;

    #[test]
    fn missing_optional_sections_get_defaults() {
        let config = parse(IRIS).unwrap();
        assert_eq!(config.dataset_name, "iris");
        assert!(config.source_transform.is_empty());
        assert_eq!(config.tables.len(), 1);
        assert!(config.tables[0].read_params.is_empty());
        assert_eq!(config.tables[0].format, None);
        assert_eq!(
            config.sources[0].source_info.get("url").and_then(|v| v.as_str()),
            Some("https://example.com/iris.csv")
        );
    }

    #[test]
    fn explicit_null_transform_list_becomes_empty() {
        let yaml = format!("{IRIS}source_transform: null\n");
        let config = parse(&yaml).unwrap();
        assert!(config.source_transform.is_empty());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse("dataset_name: [unclosed\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("test.yaml"));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let err = parse("dataset_name: iris\nsources: 3\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn misspelled_table_key_is_rejected() {
        let yaml = format!("{IRIS}    read_param: {{}}\n");
        let err = parse(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("read_param"));
    }

    #[test]
    fn missing_required_field_is_configuration_error() {
        let yaml = IRIS.replace("    source_type: url\n", "");
        let err = parse(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("sources[0].source_type"));
    }

    #[test]
    fn empty_tables_are_rejected() {
        let yaml = r#"
dataset_name: iris
sources:
  - {file: iris.csv, source_type: url, source_info: {url: "https://example.com/iris.csv"}}
tables: []
"#;
        let err = parse(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn duplicate_table_names_are_rejected() {
        let yaml = format!("{IRIS}  - name: data\n    file: iris.csv\n");
        let err = parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate table name 'data'"));
    }

    #[test]
    fn table_file_must_be_produced() {
        let yaml = IRIS.replace("    file: iris.csv\n", "    file: other.csv\n");
        let err = parse(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("other.csv"));
    }

    #[test]
    fn table_under_transform_target_dir_is_accepted() {
        let yaml = r#"
dataset_name: power
sources:
  - {file: archive.zip, source_type: url, source_info: {url: "https://example.com/a.zip"}}
source_transform:
  - transform_type: unzip
    transform_params: {file: archive.zip, target_dir: extracted}
tables:
  - {name: data, file: extracted/power.txt, read_params: {sep: ";"}}
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.source_transform.len(), 1);
        assert_eq!(config.tables[0].file, "extracted/power.txt");
        assert_eq!(
            config.tables[0].read_params.get("sep").and_then(|v| v.as_str()),
            Some(";")
        );
    }

    #[test]
    fn transform_into_dataset_dir_is_accepted() {
        let yaml = r#"
dataset_name: power
sources:
  - {file: archive.zip, source_type: url, source_info: {url: "https://example.com/a.zip"}}
source_transform:
  - transform_type: unzip
    transform_params: {file: archive.zip, target_dir: "."}
tables:
  - {name: data, file: power.txt}
  - {name: nested, file: inner/readings.txt}
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.tables.len(), 2);
    }

    #[test]
    fn escaping_target_dir_is_rejected() {
        let yaml = r#"
dataset_name: power
sources:
  - {file: archive.zip, source_type: url, source_info: {url: "https://example.com/a.zip"}}
source_transform:
  - transform_type: unzip
    transform_params: {file: archive.zip, target_dir: ".."}
tables:
  - {name: data, file: power.txt}
"#;
        let err = parse(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let yaml = IRIS.replace("- file: iris.csv", "- file: ../iris.csv");
        let err = parse(&yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    mod normalization {
        use super::*;
        use proptest::prelude::*;

        fn document(tables: &[(String, bool)]) -> String {
            let mut yaml = String::from("dataset_name: gen\nsources:\n");
            for (name, _) in tables {
                yaml.push_str(&format!(
                    "  - {{file: {name}.csv, source_type: url, source_info: {{url: 'https://example.com/{name}.csv'}}}}\n"
                ));
            }
            yaml.push_str("tables:\n");
            for (name, with_params) in tables {
                if *with_params {
                    yaml.push_str(&format!(
                        "  - {{name: {name}, file: {name}.csv, read_params: {{nrows: 1}}}}\n"
                    ));
                } else {
                    yaml.push_str(&format!("  - {{name: {name}, file: {name}.csv}}\n"));
                }
            }
            yaml
        }

        proptest! {
            #[test]
            fn tables_keep_order_and_get_default_params(
                names in proptest::collection::btree_set("tbl_[a-z]{1,6}", 1..8),
                flags in proptest::collection::vec(any::<bool>(), 8),
            ) {
                let tables: Vec<(String, bool)> = names
                    .into_iter()
                    .rev()
                    .zip(flags)
                    .collect();
                let config = parse(&document(&tables)).unwrap();

                prop_assert!(config.source_transform.is_empty());
                prop_assert_eq!(config.tables.len(), tables.len());
                for (spec, (name, with_params)) in config.tables.iter().zip(&tables) {
                    prop_assert_eq!(&spec.name, name);
                    prop_assert_eq!(spec.read_params.is_empty(), !with_params);
                }
            }
        }
    }
}
