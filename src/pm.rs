//! Package-manager invocation for npm-based generator acquisition and
//! the `install` capability helper.
//!
//! The manager itself is an opaque shell collaborator: stencil probes the
//! environment once, then drives it with plain subprocess calls. A failed
//! invocation aborts the enclosing step immediately, carrying the command
//! line and exit status.

use crate::error::{Error, Result};
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

/// A probed package manager the run can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
}

impl PackageManager {
    /// Probes the environment for an available package manager,
    /// preferring yarn when it responds to `--version`.
    ///
    /// The probe is idempotent and side-effect-free; it never touches
    /// the filesystem beyond spawning the probe process.
    pub fn detect() -> Self {
        let yarn_available = Command::new("yarn")
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if yarn_available {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Initializes an empty package project in `dir`.
    pub fn init<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        self.run(dir.as_ref(), &["init", "-y"])
    }

    /// Installs a single package reference into `dir`.
    pub fn install<P: AsRef<Path>>(&self, dir: P, package: &str) -> Result<()> {
        let args = match self {
            PackageManager::Npm => ["install", package],
            PackageManager::Yarn => ["add", package],
        };
        self.run(dir.as_ref(), &args)
    }

    /// Installs the dependencies already declared in `dir`'s manifest.
    /// Backs the `install` helper on the capability surface.
    pub fn install_all<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        self.run(dir.as_ref(), &["install"])
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<()> {
        debug!("Running '{} {}' in {}.", self.program(), args.join(" "), dir.display());

        let status = Command::new(self.program())
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(Error::IoError)?;

        if !status.success() {
            return Err(Error::SourceAcquisitionError {
                command: format!("{} {}", self.program(), args.join(" ")),
                status: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }
}
