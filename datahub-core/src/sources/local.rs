//! `local` sources: copy a file already on disk into the staging area.

use super::FetchStrategy;
use crate::config::schema::param_str;
use crate::config::SourceSpec;
use crate::error::{HubError, Result};
use crate::staging::write_atomic_with;
use std::fs;
use std::io;
use std::path::Path;

/// Copies `source_info.path` into place.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl FetchStrategy for LocalFetcher {
    fn source_type(&self) -> &'static str {
        "local"
    }

    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()> {
        let context = format!("source '{}'", source.file);
        let origin = Path::new(param_str(&source.source_info, "path", &context)?);
        let mut file = fs::File::open(origin).map_err(|e| HubError::io(origin, e))?;
        write_atomic_with(dest, |out| io::copy(&mut file, out).map(drop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Params;
    use crate::error::ErrorKind;

    fn local_source(path: &Path) -> SourceSpec {
        let mut info = Params::new();
        info.insert("path".into(), path.to_string_lossy().into_owned().into());
        SourceSpec {
            file: "copy.csv".into(),
            source_type: "local".into(),
            source_info: info,
        }
    }

    #[test]
    fn copies_file_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("origin.csv");
        fs::write(&origin, "x\n1\n").unwrap();
        let dest = dir.path().join("copy.csv");

        LocalFetcher.fetch(&local_source(&origin), &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "x\n1\n");
        assert!(crate::staging::part_files(dir.path()).is_empty());
    }

    #[test]
    fn missing_origin_is_io_error_and_stages_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("copy.csv");
        let err = LocalFetcher
            .fetch(&local_source(&dir.path().join("absent.csv")), &dest)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!dest.exists());
    }
}
