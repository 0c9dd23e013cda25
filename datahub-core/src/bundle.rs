//! Result container: named tables in declaration order.

use crate::error::{HubError, Result};
use polars::prelude::DataFrame;
use std::fmt;

/// Key used by single-table datasets.
pub const DEFAULT_TABLE: &str = "data";

/// Ordered mapping from table name to table.
///
/// Keys are unique and fixed once the pipeline has built the bundle; only
/// the table transform stage replaces values.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBundle<T = DataFrame> {
    entries: Vec<(String, T)>,
}

impl<T> Default for DataBundle<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> DataBundle<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, table)` pairs. Duplicate names are rejected.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, T)>) -> Result<Self> {
        let mut bundle = Self::new();
        for (name, table) in entries {
            bundle.insert(name, table)?;
        }
        Ok(bundle)
    }

    pub(crate) fn insert(&mut self, name: String, table: T) -> Result<()> {
        if self.contains(&name) {
            return Err(HubError::config(format!("duplicate table name '{name}'")));
        }
        self.entries.push((name, table));
        Ok(())
    }

    /// Apply `f` to every table, keeping keys and order.
    pub(crate) fn try_map<U>(
        self,
        mut f: impl FnMut(&str, T) -> Result<U>,
    ) -> Result<DataBundle<U>> {
        let entries = self
            .entries
            .into_iter()
            .map(|(name, table)| {
                let mapped = f(&name, table)?;
                Ok((name, mapped))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DataBundle { entries })
    }

    /// Table by name. Unknown names fail with a not-found error.
    pub fn get(&self, name: &str) -> Result<&T> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
            .ok_or_else(|| self.not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Table names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, table)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return one table, consuming the bundle.
    pub fn take(mut self, name: &str) -> Result<T> {
        match self.entries.iter().position(|(n, _)| n == name) {
            Some(i) => Ok(self.entries.swap_remove(i).1),
            None => Err(self.not_found(name)),
        }
    }

    fn not_found(&self, name: &str) -> HubError {
        HubError::TableNotFound {
            name: name.to_string(),
            available: self.keys().map(String::from).collect(),
        }
    }
}

impl<T> IntoIterator for DataBundle<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> fmt::Display for DataBundle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.keys().collect();
        write!(f, "DataBundle(tables=[{}])", names.join(", "))
    }
}
