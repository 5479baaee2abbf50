//! Command-line interface implementation for stencil.
//! Provides argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments structure for stencil.
///
/// Both positional arguments are optional at parse time; presence
/// validation belongs to the generator loader, which fails fast before
/// any I/O.
#[derive(Parser, Debug)]
#[command(author, version, about = "stencil: generator-driven project scaffolding", long_about = None)]
pub struct Args {
    /// Local path, package name, or git repository of the generator
    #[arg(value_name = "GENERATOR")]
    pub generator: Option<String>,

    /// Directory where the generated project will be created
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Acquire the generator with a git clone instead of the package
    /// manager. Supports pinning a tag or branch as 'repo#ref'.
    #[arg(short, long)]
    pub clone: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Extra arguments passed through to the generator
    #[arg(value_name = "ARGS", trailing_var_arg = true)]
    pub argv: Vec<String>,
}

/// Parses command line arguments and returns the Args structure.
pub fn get_args() -> Args {
    Args::parse()
}
