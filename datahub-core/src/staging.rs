//! Local staging area for fetched and transformed files.
//!
//! Layout: `{data_path}/{dataset_name}/{file}`
//!
//! Files are written atomically: each writer fills its own uniquely named
//! `.{file}.XXXXXX.part` sibling, then renames it into place. A crashed or
//! failed fetch never leaves a file that looks already staged. Two processes
//! staging the same dataset concurrently may both download; the last rename
//! wins and both observe a complete file.

use crate::error::{HubError, Result};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Suffix of in-flight temporary files.
pub const PART_SUFFIX: &str = ".part";

/// Count the normal components of a config-supplied path, rejecting
/// absolute and parent-escaping paths.
fn normal_components(value: &str) -> Result<usize> {
    let mut normal = 0usize;
    for component in Path::new(value).components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::CurDir => {}
            _ => {
                return Err(HubError::config(format!(
                    "path '{value}' must be relative to the staging directory"
                )))
            }
        }
    }
    Ok(normal)
}

/// Validate a config-supplied relative file path and return it as a `PathBuf`.
///
/// Rejects empty, absolute and parent-escaping paths.
pub fn staged_relative(file: &str) -> Result<PathBuf> {
    if normal_components(file)? == 0 {
        return Err(HubError::config(format!("path '{file}' is empty")));
    }
    Ok(PathBuf::from(file))
}

/// Validate a config-supplied relative directory.
///
/// Unlike [`staged_relative`], `.` is accepted and names the dataset
/// directory itself; it comes back as an empty path.
pub fn staged_dir(dir: &str) -> Result<PathBuf> {
    if dir.is_empty() {
        return Err(HubError::config("directory path is empty"));
    }
    if normal_components(dir)? == 0 {
        return Ok(PathBuf::new());
    }
    Ok(PathBuf::from(dir))
}

/// The staging root plus path helpers.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the staging area.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a specific dataset: `{root}/{dataset_name}/`
    pub fn dataset_dir(&self, dataset_name: &str) -> PathBuf {
        self.root.join(dataset_name)
    }

    /// Staged path for a dataset file: `{root}/{dataset_name}/{file}`
    pub fn file_path(&self, dataset_name: &str, file: &str) -> Result<PathBuf> {
        Ok(self.dataset_dir(dataset_name).join(staged_relative(file)?))
    }

    /// Like [`file_path`](Self::file_path), creating parent directories.
    pub fn prepare_file_path(&self, dataset_name: &str, file: &str) -> Result<PathBuf> {
        let path = self.file_path(dataset_name, file)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HubError::io(parent, e))?;
        }
        Ok(path)
    }
}

/// Write `path` atomically. `fill` writes the content into a temporary file
/// unique to this call, in the same directory; it is synced and renamed into
/// place only when `fill` succeeds, and removed otherwise.
pub(crate) fn write_atomic_with<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_else(|| OsStr::new("staged")));
    prefix.push(".");

    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(PART_SUFFIX)
        .tempfile_in(parent)
        .map_err(|e| HubError::io(parent, e))?;
    fill(tmp.as_file_mut())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| HubError::io(path, e))?;
    tmp.persist(path).map_err(|e| HubError::io(path, e.error))?;
    Ok(())
}

/// Write `bytes` to `path` atomically.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic_with(path, |file| file.write_all(bytes))
}

/// In-flight temporary files directly under `dir`.
#[cfg(test)]
pub(crate) fn part_files(dir: &Path) -> Vec<PathBuf> {
    let mut parts: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.to_string_lossy().ends_with(PART_SUFFIX))
                .collect()
        })
        .unwrap_or_default();
    parts.sort();
    parts
}
