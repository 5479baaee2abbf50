//! Composable pipeline stages over file record streams.
//!
//! A stage is a unary transform with exclusive ownership of each record
//! it processes. The driver feeds one record at a time through the
//! declared stage order, so a record reaches stage N+1 only after stage
//! N has finished with it.

use crate::error::{Error, Result};
use crate::record::FileRecord;
use crate::renderer::TemplateRenderer;
use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Ignore file discovered at the source root.
pub const IGNORE_FILE: &str = ".gitignore";

/// Manifest file the packages stage patches.
pub const PACKAGES_MANIFEST: &str = "package.json";

/// Rules applied even without an ignore file.
const BUILTIN_IGNORE: [&str; 2] = [".git", "**/.git/**"];

/// Trait for pipeline stages.
pub trait Stage {
    /// Processes one record. The stage owns the record for the duration
    /// of the call and returns it (or a replacement) to release it
    /// downstream; `None` drops it from the stream.
    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>>;
}

/// Drives every record from `stream` through `stages` in declared order.
///
/// Completes once the stream is fully drained through every stage, or
/// aborts on the first stage or stream error. Files already written by a
/// terminal stage are not rolled back.
pub fn pipeline<I>(stream: I, mut stages: Vec<Box<dyn Stage + '_>>) -> Result<()>
where
    I: IntoIterator<Item = Result<FileRecord>>,
{
    for record in stream {
        let mut current = Some(record?);
        for stage in stages.iter_mut() {
            current = match current {
                Some(record) => stage.process(record)?,
                None => break,
            };
        }
    }
    Ok(())
}

/// Drops records matching version-control ignore rules discovered near
/// the source root.
pub struct IgnoreFilter {
    patterns: GlobSet,
}

impl IgnoreFilter {
    /// Reads ignore rules from the source root's ignore file. A missing
    /// file yields only the built-in rules.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a rule fails to compile
    pub fn from_source_root<P: AsRef<Path>>(source_root: P) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in BUILTIN_IGNORE {
            builder.add(compile_rule(pattern)?);
        }

        let ignore_path = source_root.as_ref().join(IGNORE_FILE);
        if let Ok(contents) = fs::read_to_string(&ignore_path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                builder.add(compile_rule(line)?);
            }
        } else {
            debug!("{IGNORE_FILE} does not exist");
        }

        let patterns = builder
            .build()
            .map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))?;

        Ok(Self { patterns })
    }
}

fn compile_rule(pattern: &str) -> Result<Glob> {
    Glob::new(pattern)
        .map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))
}

impl Stage for IgnoreFilter {
    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>> {
        let relative = record.relative()?.to_path_buf();
        if self.patterns.is_match(&relative) {
            debug!("Skipping ignored file '{}'.", relative.display());
            return Ok(None);
        }
        Ok(Some(record))
    }
}

/// Enriches each record's metadata without touching its contents.
pub struct Metadata {
    values: serde_json::Map<String, serde_json::Value>,
}

impl Metadata {
    pub fn new(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { values }
    }
}

impl Stage for Metadata {
    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        for (key, value) in &self.values {
            record.meta.insert(key.clone(), value.clone());
        }
        Ok(Some(record))
    }
}

/// Renders record contents through the template renderer.
///
/// The run context is merged with per-record metadata, record values
/// winning. Records whose contents are not valid UTF-8 pass through
/// untouched.
pub struct Template<'a> {
    renderer: &'a dyn TemplateRenderer,
    context: serde_json::Value,
}

impl<'a> Template<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, context: serde_json::Value) -> Self {
        Self { renderer, context }
    }
}

impl Stage for Template<'_> {
    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let rendered = match std::str::from_utf8(&record.contents) {
            Ok(text) => {
                let mut context = self.context.clone();
                if let serde_json::Value::Object(map) = &mut context {
                    for (key, value) in &record.meta {
                        map.insert(key.clone(), value.clone());
                    }
                }
                Some(self.renderer.render(text, &context)?)
            }
            Err(_) => None,
        };

        if let Some(rendered) = rendered {
            record.contents = rendered.into_bytes();
        }
        Ok(Some(record))
    }
}

/// Merges a JSON patch into manifest records.
///
/// Top-level object values merge one level deep (so `dependencies`
/// entries accumulate); everything else is replaced. Non-manifest
/// records pass through untouched.
pub struct Packages {
    manifest: String,
    patch: serde_json::Map<String, serde_json::Value>,
}

impl Packages {
    pub fn new(patch: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { manifest: PACKAGES_MANIFEST.to_string(), patch }
    }
}

impl Stage for Packages {
    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        let is_manifest =
            record.path.file_name().and_then(|n| n.to_str()) == Some(self.manifest.as_str());
        if !is_manifest {
            return Ok(Some(record));
        }

        let mut manifest: IndexMap<String, serde_json::Value> =
            serde_json::from_slice(&record.contents).map_err(|e| {
                Error::ConfigError(format!(
                    "invalid manifest in '{}': {e}",
                    record.path.display()
                ))
            })?;

        for (key, value) in &self.patch {
            let merged = match (manifest.get(key), value) {
                (
                    Some(serde_json::Value::Object(existing)),
                    serde_json::Value::Object(incoming),
                ) => {
                    let mut combined = existing.clone();
                    for (k, v) in incoming {
                        combined.insert(k.clone(), v.clone());
                    }
                    serde_json::Value::Object(combined)
                }
                _ => value.clone(),
            };
            manifest.insert(key.clone(), merged);
        }

        record.contents = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        Ok(Some(record))
    }
}

/// Caller-supplied transform stage. Content and path rewriting are both
/// permitted; a stage changing `base` must go through
/// [`FileRecord::set_destination`] to keep the prefix invariant.
pub struct Modify<F> {
    transform: F,
}

impl<F> Modify<F>
where
    F: FnMut(FileRecord) -> Result<Option<FileRecord>>,
{
    pub fn new(transform: F) -> Self {
        Self { transform }
    }
}

impl<F> Stage for Modify<F>
where
    F: FnMut(FileRecord) -> Result<Option<FileRecord>>,
{
    fn process(&mut self, record: FileRecord) -> Result<Option<FileRecord>> {
        (self.transform)(record)
    }
}

/// Terminal stage writing records under an output folder.
///
/// Not transactional: a failure partway through a batch leaves
/// previously written files in place.
pub struct Dest {
    out_base: PathBuf,
}

impl Dest {
    /// `folder` resolves against the run's destination root; when
    /// omitted the root itself is the output base.
    pub fn new<P: AsRef<Path>>(dest_root: P, folder: Option<&str>) -> Self {
        let dest_root = dest_root.as_ref();
        let out_base = match folder {
            Some(folder) => dest_root.join(folder),
            None => dest_root.to_path_buf(),
        };
        Self { out_base }
    }
}

impl Stage for Dest {
    fn process(&mut self, mut record: FileRecord) -> Result<Option<FileRecord>> {
        record.set_destination(self.out_base.clone())?;

        if let Some(parent) = record.path.parent() {
            fs::create_dir_all(parent).map_err(Error::IoError)?;
        }
        fs::write(&record.path, &record.contents).map_err(Error::IoError)?;

        debug!("Writing file: {}", record.path.display());
        Ok(Some(record))
    }
}
