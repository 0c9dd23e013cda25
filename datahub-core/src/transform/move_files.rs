//! `move`: relocate glob-matched staged files into a directory.
//!
//! Params: `pattern` (glob, relative to the dataset directory) and
//! `target_dir` (created if absent). Matching nothing is not an error, which
//! keeps reruns idempotent once the files have already been moved.

use super::{param_dir, RawTransform};
use crate::config::schema::param_str;
use crate::config::Params;
use crate::error::{HubError, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveFiles;

impl RawTransform for MoveFiles {
    fn transform_type(&self) -> &'static str {
        "move"
    }

    fn apply(&self, params: &Params, dataset_dir: &Path) -> Result<()> {
        let pattern = param_str(params, "pattern", "move transform")?;
        let target_dir = param_dir(params, "target_dir", "move", dataset_dir)?;

        let matches = matching_files(dataset_dir, pattern)?;
        if matches.is_empty() {
            log::debug!("move: nothing matches '{pattern}' in {}", dataset_dir.display());
            return Ok(());
        }

        fs::create_dir_all(&target_dir).map_err(|e| HubError::io(&target_dir, e))?;
        for src in matches {
            if src == target_dir || src.parent() == Some(target_dir.as_path()) {
                continue;
            }
            let Some(name) = src.file_name() else {
                continue;
            };
            let dest = target_dir.join(name);
            fs::rename(&src, &dest).map_err(|e| HubError::io(&src, e))?;
            log::debug!("moved {} -> {}", src.display(), dest.display());
        }
        Ok(())
    }
}

/// Paths under `dataset_dir` matching the relative glob `pattern`.
fn matching_files(dataset_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if Path::new(pattern).is_absolute() || pattern.split(['/', '\\']).any(|c| c == "..") {
        return Err(HubError::config(format!(
            "move pattern '{pattern}' must be relative to the dataset directory"
        )));
    }
    let base = glob::Pattern::escape(&dataset_dir.to_string_lossy());
    let full = format!("{base}/{pattern}");
    let paths = glob::glob(&full)
        .map_err(|e| HubError::config(format!("invalid move pattern '{pattern}': {e}")))?;

    let mut out = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            HubError::io(path, std::io::Error::from(e))
        })?;
        out.push(path);
    }
    Ok(out)
}
