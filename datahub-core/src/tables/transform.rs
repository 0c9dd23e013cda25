//! Per-table post-processing hook.
//!
//! Runs once per loaded table, after every table has been read. The default
//! is [`Identity`]. Closures of the right shape work as transforms too.

use crate::bundle::DataBundle;
use crate::error::Result;
use polars::prelude::DataFrame;

pub trait TableTransform: Send + Sync {
    fn transform(&self, name: &str, table: DataFrame) -> Result<DataFrame>;
}

/// Returns every table unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl TableTransform for Identity {
    fn transform(&self, _name: &str, table: DataFrame) -> Result<DataFrame> {
        Ok(table)
    }
}

impl<F> TableTransform for F
where
    F: Fn(&str, DataFrame) -> Result<DataFrame> + Send + Sync,
{
    fn transform(&self, name: &str, table: DataFrame) -> Result<DataFrame> {
        self(name, table)
    }
}

/// Apply `transform` to every table. Keys and their order are preserved.
pub fn transform_tables(bundle: DataBundle, transform: &dyn TableTransform) -> Result<DataBundle> {
    bundle.try_map(|name, table| transform.transform(name, table))
}
