//! Convenience loaders for the bundled catalog.
//!
//! Each returns the dataset's single `"data"` table. `verbose` overrides the
//! session setting for the documentation-link hook.

use crate::bundle::DEFAULT_TABLE;
use crate::error::Result;
use crate::get_data;
use polars::prelude::DataFrame;

fn single_table(dataset_name: &str, task_type: &str, verbose: Option<bool>) -> Result<DataFrame> {
    get_data(dataset_name, task_type, verbose)?.take(DEFAULT_TABLE)
}

pub mod classification {
    use super::*;

    pub const TASK_TYPE: &str = "classification";

    /// Fisher's iris measurements. Target column: `species`.
    pub fn iris(verbose: Option<bool>) -> Result<DataFrame> {
        single_table("iris", TASK_TYPE, verbose)
    }

    /// Titanic passenger records. Target column: `survived`.
    pub fn titanic(verbose: Option<bool>) -> Result<DataFrame> {
        single_table("titanic", TASK_TYPE, verbose)
    }
}

pub mod regression {
    use super::*;

    pub const TASK_TYPE: &str = "regression";

    /// California housing districts (1990 census). Target column:
    /// `median_house_value`.
    pub fn housing(verbose: Option<bool>) -> Result<DataFrame> {
        single_table("housing", TASK_TYPE, verbose)
    }
}

pub mod timeseries {
    use super::*;

    pub const TASK_TYPE: &str = "timeseries";

    /// Minute-level electric power consumption of one household, Dec 2006
    /// to Nov 2010. Missing measurements are null.
    pub fn household_power(verbose: Option<bool>) -> Result<DataFrame> {
        single_table("household_power", TASK_TYPE, verbose)
    }
}
