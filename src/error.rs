//! Error handling for the stencil application.
//! Defines the error types and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// All errors that can occur while resolving a generator and running
/// its pipelines.
///
/// The core performs no local recovery or retry; every variant propagates
/// unchanged to the caller, preserving the underlying failure's identity
/// (shell exit codes, git2 and minijinja errors) where one exists.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem operation failures (glob reads, directory creation, writes)
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Git clone, checkout or init failures
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Template rendering failures
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// The generator reference positional argument was not provided
    #[error("Missing generator argument.")]
    MissingGeneratorError,

    /// The output directory positional argument was not provided
    #[error("Missing output directory argument.")]
    MissingDirectoryError,

    /// A package-manager invocation exited with a non-zero status
    #[error("Source acquisition failed: '{command}' exited with status {status}.")]
    SourceAcquisitionError { command: String, status: i32 },

    /// The installed manifest could not supply a generator package
    #[error("Source acquisition failed: {0}.")]
    ManifestError(String),

    /// A glob pattern failed to compile
    #[error("Glob error: {0}.")]
    GlobError(String),

    /// Malformed generator plan or ignore file
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// A pipeline stage observed a broken record invariant
    #[error("Pipeline error: {0}.")]
    PipelineError(String),

    /// Prompt interaction failures
    #[error("Prompt error: {0}.")]
    PromptError(String),
}

/// Convenience type alias for Results with stencil's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
