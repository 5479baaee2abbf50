//! Lazy glob expansion of a source tree into file records.
//!
//! Patterns are expanded in input order, one match at a time; each match
//! is fully read before the next is produced, so a pipeline holds at most
//! one in-flight file's contents. The stream is finite and not
//! restartable, and the first error stops it permanently.

use crate::error::{Error, Result};
use crate::record::FileRecord;
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Exclusion applied to every expansion, on top of caller-supplied patterns.
pub const DEFAULT_EXCLUDE: &str = "**/node_modules/**";

/// A lazily produced sequence of file records matched by glob patterns.
pub struct FileStream {
    cwd: PathBuf,
    exclude: GlobSet,
    patterns: std::vec::IntoIter<PatternSpec>,
    active: Option<ActiveWalk>,
    done: bool,
}

struct PatternSpec {
    matcher: GlobMatcher,
    base: PathBuf,
    absolute: bool,
}

struct ActiveWalk {
    matcher: GlobMatcher,
    base: PathBuf,
    absolute: bool,
    walker: walkdir::IntoIter,
}

fn has_glob_meta(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Returns the static (non-wildcard) parent directory of a pattern.
/// A trailing literal file name is not part of the base.
fn static_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    let mut components = Path::new(pattern).components().peekable();

    while let Some(component) = components.next() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                if has_glob_meta(&part) || components.peek().is_none() {
                    return prefix;
                }
                prefix.push(part.as_ref());
            }
            other => prefix.push(other.as_os_str()),
        }
    }

    prefix
}

impl FileStream {
    /// Expands `patterns` against `cwd` into a lazy record stream.
    ///
    /// # Arguments
    /// * `patterns` - Glob patterns, expanded in input order
    /// * `cwd` - Directory the patterns are resolved against
    /// * `exclude` - Extra exclusion globs, applied with [`DEFAULT_EXCLUDE`]
    ///
    /// # Errors
    /// * `Error::GlobError` if a pattern fails to compile
    pub fn expand<I, S>(patterns: I, cwd: &Path, exclude: &[&str]) -> Result<FileStream>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut specs = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .map_err(|e| Error::GlobError(format!("invalid pattern '{pattern}': {e}")))?;
            specs.push(PatternSpec {
                matcher: glob.compile_matcher(),
                base: cwd.join(static_prefix(pattern)),
                absolute: Path::new(pattern).is_absolute(),
            });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in std::iter::once(DEFAULT_EXCLUDE).chain(exclude.iter().copied()) {
            builder.add(
                Glob::new(pattern)
                    .map_err(|e| Error::GlobError(format!("invalid exclusion '{pattern}': {e}")))?,
            );
        }
        let exclude = builder
            .build()
            .map_err(|e| Error::GlobError(format!("exclusion set failed to build: {e}")))?;

        Ok(FileStream {
            cwd: cwd.to_path_buf(),
            exclude,
            patterns: specs.into_iter(),
            active: None,
            done: false,
        })
    }
}

impl Iterator for FileStream {
    type Item = Result<FileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.active.is_none() {
                match self.patterns.next() {
                    Some(spec) => {
                        debug!("Expanding pattern from '{}'.", spec.base.display());
                        self.active = Some(ActiveWalk {
                            walker: WalkDir::new(&spec.base).into_iter(),
                            matcher: spec.matcher,
                            base: spec.base,
                            absolute: spec.absolute,
                        });
                    }
                    None => return None,
                }
            }

            let Some(walk) = self.active.as_mut() else {
                continue;
            };

            match walk.walker.next() {
                None => {
                    self.active = None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(Error::IoError(err.into())));
                }
                Some(Ok(entry)) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.path();
                    let candidate = if walk.absolute {
                        path
                    } else {
                        path.strip_prefix(&self.cwd).unwrap_or(path)
                    };
                    if !walk.matcher.is_match(candidate) {
                        continue;
                    }
                    if self.exclude.is_match(candidate) {
                        debug!("Excluding '{}'.", candidate.display());
                        continue;
                    }
                    match fs::read(path) {
                        Ok(contents) => {
                            return Some(Ok(FileRecord::new(
                                contents,
                                path.to_path_buf(),
                                walk.base.clone(),
                                self.cwd.clone(),
                            )));
                        }
                        Err(err) => {
                            self.done = true;
                            return Some(Err(Error::IoError(err)));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_prefix() {
        assert_eq!(static_prefix("templates/**/*.md"), PathBuf::from("templates"));
        assert_eq!(static_prefix("**/*"), PathBuf::from(""));
        assert_eq!(static_prefix("README.md"), PathBuf::from(""));
        assert_eq!(static_prefix("docs/guide/intro.md"), PathBuf::from("docs/guide"));
        assert_eq!(static_prefix("src/*.rs"), PathBuf::from("src"));
    }
}
