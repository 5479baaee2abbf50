//! Ephemeral workspace allocation for generator downloads.
//!
//! Every resolution step that needs to download anything (a package
//! install, a git clone) gets its own uniquely named directory, so
//! concurrent runs never collide. The directories are not removed here;
//! their lifetime is managed by whoever owns the run.

use crate::error::Result;
use std::path::PathBuf;

const WORKSPACE_PREFIX: &str = "stencil-";

/// Allocates a fresh, uniquely named workspace directory under the
/// system temporary directory.
///
/// # Returns
/// * `Result<PathBuf>` - Path to the created directory
///
/// The returned directory exists and is empty. It is detached from any
/// automatic cleanup.
pub fn allocate() -> Result<PathBuf> {
    let dir = tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?;
    Ok(dir.keep())
}
