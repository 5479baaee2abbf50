//! Generator source resolution.
//!
//! A generator reference is classified as a local path or a package
//! reference; package references are acquired either through the package
//! manager or, with the clone flag, through git. Downloads land in
//! ephemeral workspaces owned by the run.

use crate::error::{Error, Result};
use crate::pm::PackageManager;
use crate::workspace;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;

/// Directory the package manager installs packages into.
const INSTALL_DIR: &str = "node_modules";

/// Manifest file written by package-manager init/install.
const MANIFEST_FILE: &str = "package.json";

/// How a resolved source was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Local,
    Npm,
    GitClone,
}

/// The absolute directory containing a generator's files after any
/// necessary download. Created once per run and never mutated; workspace
/// variants are not cleaned up here.
#[derive(Debug)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub provenance: Provenance,
}

/// Represents the reference form of a generator before resolution.
#[derive(Debug)]
pub enum GeneratorSource {
    /// Local filesystem path (`~`, `.` or `/` prefix)
    FileSystem(PathBuf),
    /// Package reference installed with the package manager
    Package(String),
    /// Git repository, optionally pinned as `repo#tagOrBranch`
    Git(String),
}

impl std::fmt::Display for GeneratorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            GeneratorSource::Package(name) => write!(f, "package: '{name}'"),
            GeneratorSource::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl GeneratorSource {
    /// Classifies a generator reference.
    ///
    /// References starting with `~`, `.` or `/` are local paths; anything
    /// else is a package reference, acquired with git when `clone` is set
    /// and with the package manager otherwise.
    pub fn from_string(s: &str, clone: bool) -> Self {
        if s.starts_with('~') || s.starts_with('.') || s.starts_with('/') {
            Self::FileSystem(PathBuf::from(s))
        } else if clone {
            Self::Git(s.to_string())
        } else {
            Self::Package(s.to_string())
        }
    }
}

/// Trait for resolving generator sources into local directories.
pub trait SourceResolver {
    fn resolve(&self) -> Result<ResolvedSource>;
}

/// Resolver for generators on the local filesystem.
pub struct LocalResolver {
    path: PathBuf,
}

impl LocalResolver {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SourceResolver for LocalResolver {
    /// Resolves a local path to its absolute form.
    ///
    /// No existence check is performed here; a missing directory is
    /// discovered later, when its files are globbed.
    fn resolve(&self) -> Result<ResolvedSource> {
        let expanded = shellexpand::tilde(&self.path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir().map_err(Error::IoError)?.join(path)
        };

        Ok(ResolvedSource { path, provenance: Provenance::Local })
    }
}

/// Resolver for generators published as packages.
pub struct NpmResolver {
    package: String,
    manager: PackageManager,
}

impl NpmResolver {
    pub fn new(package: String, manager: PackageManager) -> Self {
        Self { package, manager }
    }
}

impl SourceResolver for NpmResolver {
    /// Installs the package into a fresh workspace and resolves the
    /// installed package directory from the workspace manifest.
    fn resolve(&self) -> Result<ResolvedSource> {
        let workspace = workspace::allocate()?;
        debug!("Installing '{}' into '{}'.", self.package, workspace.display());

        self.manager.init(&workspace)?;
        self.manager.install(&workspace, &self.package)?;

        let contents =
            std::fs::read_to_string(workspace.join(MANIFEST_FILE)).map_err(Error::IoError)?;
        let name = first_dependency(&contents)?;

        Ok(ResolvedSource {
            path: workspace.join(INSTALL_DIR).join(name),
            provenance: Provenance::Npm,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: IndexMap<String, serde_json::Value>,
}

/// Takes the name of the first dependency declared in a workspace
/// manifest.
///
/// Precondition: exactly one package was installed into the workspace,
/// so the manifest declares exactly one dependency. The map preserves
/// the manifest's textual order, and the first key is taken.
///
/// # Errors
/// * `Error::ManifestError` if the manifest is unparsable or declares
///   zero dependencies
pub fn first_dependency(manifest: &str) -> Result<String> {
    let manifest: Manifest = serde_json::from_str(manifest)
        .map_err(|e| Error::ManifestError(format!("invalid manifest: {e}")))?;

    manifest.dependencies.keys().next().cloned().ok_or_else(|| {
        Error::ManifestError("installed manifest declares no dependencies".to_string())
    })
}

/// Resolver for generators in git repositories.
pub struct GitResolver {
    repo: String,
}

impl GitResolver {
    pub fn new(repo: String) -> Self {
        Self { repo }
    }
}

impl SourceResolver for GitResolver {
    /// Clones the repository into a fresh workspace; a `repo#ref` suffix
    /// pins the checkout to that tag or branch.
    ///
    /// Subfolder and commit-hash addressing are not supported.
    fn resolve(&self) -> Result<ResolvedSource> {
        let (repo_url, refspec) = split_git_ref(&self.repo);

        let workspace = workspace::allocate()?;
        debug!("Cloning '{}' into '{}'.", repo_url, workspace.display());

        // Set up authentication callbacks
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key(
                username_from_url.unwrap_or("git"),
                None,
                std::path::Path::new(&format!(
                    "{}/.ssh/id_rsa",
                    std::env::var("HOME").unwrap_or_default()
                )),
                None,
            )
        });

        // Configure fetch options with callbacks
        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);

        let repo = builder.clone(repo_url, &workspace)?;
        if let Some(refspec) = refspec {
            checkout_ref(&repo, refspec)?;
        }

        Ok(ResolvedSource { path: workspace, provenance: Provenance::GitClone })
    }
}

/// Checks out a tag or branch after a clone.
fn checkout_ref(repo: &git2::Repository, refspec: &str) -> Result<()> {
    let (object, reference) = repo.revparse_ext(refspec)?;
    repo.checkout_tree(&object, None)?;
    match reference.and_then(|r| r.name().map(str::to_owned)) {
        Some(name) => repo.set_head(&name)?,
        None => repo.set_head_detached(object.id())?,
    }
    Ok(())
}

/// Splits a git reference into its repository URL and optional pin.
/// Exposed for resolution-free inspection of references.
pub fn split_git_ref(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((repo, refspec)) => (repo, Some(refspec)),
        None => (reference, None),
    }
}

/// Resolves a generator reference into a local source directory.
///
/// The package manager is probed only when a package acquisition is
/// actually needed, so local and git references never spawn a probe.
pub fn resolve_source(generator: &str, clone: bool) -> Result<ResolvedSource> {
    let source = GeneratorSource::from_string(generator, clone);

    println!("Using generator from the {source}");

    let resolver: Box<dyn SourceResolver> = match source {
        GeneratorSource::FileSystem(path) => Box::new(LocalResolver::new(path)),
        GeneratorSource::Package(name) => {
            Box::new(NpmResolver::new(name, PackageManager::detect()))
        }
        GeneratorSource::Git(repo) => Box::new(GitResolver::new(repo)),
    };

    resolver.resolve()
}
