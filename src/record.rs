//! File records flowing through scaffolding pipelines.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// One file's contents plus path metadata as it moves through a pipeline.
///
/// `base` is always a prefix of `path`; the relative path is derived from
/// the two. Stages receive exclusive ownership of a record, may mutate it,
/// and hand it back, so no two stages ever observe the same record at once.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Raw contents, loaded eagerly when the record is created
    pub contents: Vec<u8>,
    /// Absolute resolved path
    pub path: PathBuf,
    /// Prefix of `path` relative to which the relative path is computed
    pub base: PathBuf,
    /// Originating working directory, informational
    pub cwd: PathBuf,
    /// Metadata injected by stages (project name and the like)
    pub meta: serde_json::Map<String, serde_json::Value>,
}

impl FileRecord {
    pub fn new(contents: Vec<u8>, path: PathBuf, base: PathBuf, cwd: PathBuf) -> Self {
        Self { contents, path, base, cwd, meta: serde_json::Map::new() }
    }

    /// The record's path relative to its base.
    ///
    /// # Errors
    /// * `Error::PipelineError` if `base` is not a prefix of `path`
    pub fn relative(&self) -> Result<&Path> {
        self.path.strip_prefix(&self.base).map_err(|_| {
            Error::PipelineError(format!(
                "record base '{}' is not a prefix of path '{}'",
                self.base.display(),
                self.path.display()
            ))
        })
    }

    /// Moves the record under a new base directory, recomputing `path`
    /// so the prefix invariant holds. The relative path is preserved.
    pub fn set_destination(&mut self, out_base: PathBuf) -> Result<()> {
        let relative = self.relative()?.to_path_buf();
        self.path = out_base.join(relative);
        self.base = out_base;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, base: &str) -> FileRecord {
        FileRecord::new(
            b"content".to_vec(),
            PathBuf::from(path),
            PathBuf::from(base),
            PathBuf::from(base),
        )
    }

    #[test]
    fn test_relative_derivation() {
        let record = record("/src/templates/a/b.txt", "/src/templates");
        assert_eq!(record.relative().unwrap(), Path::new("a/b.txt"));
    }

    #[test]
    fn test_relative_rejects_foreign_base() {
        let mut record = record("/src/templates/a.txt", "/src/templates");
        record.base = PathBuf::from("/elsewhere");
        assert!(record.relative().is_err());
    }

    #[test]
    fn test_set_destination_recomputes_path() {
        let mut record = record("/src/templates/a/b.txt", "/src/templates");
        record.set_destination(PathBuf::from("/out")).unwrap();

        assert_eq!(record.path, PathBuf::from("/out/a/b.txt"));
        assert_eq!(record.base, PathBuf::from("/out"));
        assert_eq!(record.relative().unwrap(), Path::new("a/b.txt"));
    }
}
