//! The capability surface handed to generators.
//!
//! One `Api` is constructed per run, bound to the resolved source and
//! the destination. It is immutable after construction; test overrides
//! are merged in by the loader before the generator ever sees it.

use crate::error::Result;
use crate::pipeline::{
    self, Dest, IgnoreFilter, Metadata, Modify, Packages, Stage, Template,
};
use crate::plan::CONFIG_FILES;
use crate::pm::PackageManager;
use crate::prompt::{DialoguerPrompter, Prompter};
use crate::record::FileRecord;
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::stream::FileStream;
use std::path::{Path, PathBuf};

/// Per-run metadata handed to the generator alongside the capability
/// surface.
#[derive(Debug, Clone)]
pub struct Context {
    /// Destination absolute path
    pub path: PathBuf,
    /// Project name, derived from the destination's final path segment
    pub name: String,
    /// Arguments passed through to the generator
    pub argv: Vec<String>,
}

impl Context {
    /// The context as a template rendering value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path.display().to_string(),
            "name": self.name,
            "argv": self.argv,
        })
    }
}

/// The functions exposed to a generator for reading, transforming and
/// writing files, plus install/git-init/prompt helpers bound to the
/// destination.
pub struct Api {
    source_root: PathBuf,
    dest_root: PathBuf,
    manager: Option<PackageManager>,
    renderer: Box<dyn TemplateRenderer>,
    prompter: Box<dyn Prompter>,
}

impl Api {
    pub fn new(source_root: PathBuf, dest_root: PathBuf) -> Self {
        Self {
            source_root,
            dest_root,
            manager: None,
            renderer: Box::new(MiniJinjaRenderer::new()),
            prompter: Box::new(DialoguerPrompter::new()),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn dest_root(&self) -> &Path {
        &self.dest_root
    }

    /// Expands glob patterns against the resolved source into a lazy
    /// record stream. Generator plan files are never part of the stream.
    pub fn src<I, S>(&self, patterns: I) -> Result<FileStream>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FileStream::expand(patterns, &self.source_root, &CONFIG_FILES)
    }

    /// A terminal write stage under the destination, or under `folder`
    /// within it.
    pub fn dest(&self, folder: Option<&str>) -> Dest {
        Dest::new(&self.dest_root, folder)
    }

    /// Drives a record stream through the given stages to completion.
    pub fn pipeline<I>(&self, stream: I, stages: Vec<Box<dyn Stage + '_>>) -> Result<()>
    where
        I: IntoIterator<Item = Result<FileRecord>>,
    {
        pipeline::pipeline(stream, stages)
    }

    /// The ignore-filter stage for this run's source root.
    pub fn ignore(&self) -> Result<IgnoreFilter> {
        IgnoreFilter::from_source_root(&self.source_root)
    }

    /// The metadata stage carrying this run's project name.
    pub fn metadata(&self, context: &Context) -> Metadata {
        let mut values = serde_json::Map::new();
        values.insert("name".to_string(), serde_json::Value::String(context.name.clone()));
        Metadata::new(values)
    }

    /// The template stage rendering contents with the run context.
    pub fn template(&self, context: &Context) -> Template<'_> {
        Template::new(self.renderer.as_ref(), context.to_value())
    }

    /// The packages stage merging a patch into manifest records.
    pub fn packages(&self, patch: serde_json::Map<String, serde_json::Value>) -> Packages {
        Packages::new(patch)
    }

    /// A caller-supplied transform stage.
    pub fn modify<F>(&self, transform: F) -> Modify<F>
    where
        F: FnMut(FileRecord) -> Result<Option<FileRecord>>,
    {
        Modify::new(transform)
    }

    /// Installs the dependencies declared in the destination's manifest.
    /// The package manager is probed on first use unless an override
    /// supplied one.
    pub fn install(&self) -> Result<()> {
        let manager = self.manager.unwrap_or_else(PackageManager::detect);
        manager.install_all(&self.dest_root)
    }

    /// Initializes a git repository at the destination.
    pub fn git_init(&self) -> Result<()> {
        git2::Repository::init(&self.dest_root)?;
        Ok(())
    }

    /// Asks the user a yes/no question.
    pub fn confirm(&self, message: String) -> Result<bool> {
        self.prompter.confirm(false, message)
    }
}

/// Test/mocking replacements merged onto the surface and context before
/// the generator is invoked. Set fields win; unset fields keep the
/// values the loader bound.
#[derive(Default)]
pub struct Overrides {
    pub source_root: Option<PathBuf>,
    pub dest_root: Option<PathBuf>,
    pub manager: Option<PackageManager>,
    pub renderer: Option<Box<dyn TemplateRenderer>>,
    pub prompter: Option<Box<dyn Prompter>>,
    pub name: Option<String>,
    pub argv: Option<Vec<String>>,
}

impl Overrides {
    pub(crate) fn apply(self, api: &mut Api, context: &mut Context) {
        if let Some(source_root) = self.source_root {
            api.source_root = source_root;
        }
        if let Some(dest_root) = self.dest_root {
            api.dest_root = dest_root;
        }
        if let Some(manager) = self.manager {
            api.manager = Some(manager);
        }
        if let Some(renderer) = self.renderer {
            api.renderer = renderer;
        }
        if let Some(prompter) = self.prompter {
            api.prompter = prompter;
        }
        if let Some(name) = self.name {
            context.name = name;
        }
        if let Some(argv) = self.argv {
            context.argv = argv;
        }
    }
}
