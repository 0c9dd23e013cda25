//! `unzip`: extract a staged zip archive.
//!
//! Params: `file` (archive, relative to the dataset directory) and
//! `target_dir` (extraction root, created if absent). Entries whose names
//! would escape `target_dir` are rejected. `target_dir: "."` extracts into the
//! dataset directory itself. Every entry is written through its own temporary
//! file, so a failed extraction never leaves a truncated member.

use super::{param_dir, param_path, RawTransform};
use crate::config::Params;
use crate::error::{HubError, Result};
use crate::staging::write_atomic_with;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct Unzip;

impl RawTransform for Unzip {
    fn transform_type(&self) -> &'static str {
        "unzip"
    }

    fn apply(&self, params: &Params, dataset_dir: &Path) -> Result<()> {
        let archive_path = param_path(params, "file", "unzip", dataset_dir)?;
        let target_dir = param_dir(params, "target_dir", "unzip", dataset_dir)?;
        let count = extract(&archive_path, &target_dir)?;
        log::info!(
            "extracted {count} entries from {} into {}",
            archive_path.display(),
            target_dir.display()
        );
        Ok(())
    }
}

/// Extract every entry of `archive_path` under `target_dir`. Returns the
/// number of files written.
pub fn extract(archive_path: &Path, target_dir: &Path) -> Result<usize> {
    let archive_err = |source| HubError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };
    let file = fs::File::open(archive_path).map_err(|e| HubError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;
    fs::create_dir_all(target_dir).map_err(|e| HubError::io(target_dir, e))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_err)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            HubError::config(format!(
                "archive {} contains unsafe entry '{}'",
                archive_path.display(),
                entry.name()
            ))
        })?;
        let out = target_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| HubError::io(&out, e))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| HubError::io(parent, e))?;
        }

        write_atomic_with(&out, |dest| io::copy(&mut entry, dest).map(drop))?;
        written += 1;
    }
    Ok(written)
}
