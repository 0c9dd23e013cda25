//! Documentation-link hook run after a successful retrieval.
//!
//! Each `(task_type, dataset_name)` pair is announced at most once per
//! process, and only when verbose.

use std::collections::BTreeSet;
use std::sync::Mutex;

/// Root of the hosted dataset documentation.
pub const DOCS_BASE_URL: &str = "https://getdatasethub.github.io/dataset-hub/datasets";

static ANNOUNCED: Mutex<BTreeSet<(String, String)>> = Mutex::new(BTreeSet::new());

/// Documentation page for a dataset.
pub fn doc_url(dataset_name: &str, task_type: &str) -> String {
    format!("{DOCS_BASE_URL}/{task_type}/{dataset_name}.html")
}

/// Log the documentation link for a dataset. Returns whether it was logged.
pub fn log_dataset_doc_link(dataset_name: &str, task_type: &str, verbose: bool) -> bool {
    if !verbose {
        return false;
    }
    let key = (task_type.to_string(), dataset_name.to_string());
    let first = match ANNOUNCED.lock() {
        Ok(mut seen) => seen.insert(key),
        Err(poisoned) => poisoned.into_inner().insert(key),
    };
    if first {
        log::info!(
            "{dataset_name}: documentation at {}",
            doc_url(dataset_name, task_type)
        );
    }
    first
}
