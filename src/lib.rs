//! stencil is a generator-driven project scaffolding engine.
//! Given a generator - a local directory, a package, or a git
//! repository - and a target directory, it resolves the generator's
//! source and exposes a streaming file pipeline the generator uses to
//! read template files, transform them, and write them into the new
//! project.

/// The capability surface and run context handed to generators
pub mod api;

/// Command-line interface module for the stencil application
pub mod cli;

/// Error types and handling for the stencil application
pub mod error;

/// Generator loading and orchestration
/// Discovers a declarative plan at the source root or falls back to the
/// built-in default generator
pub mod generator;

/// Composable pipeline stages: ignore filtering, metadata injection,
/// template rendering, manifest patching, user transforms, and the
/// destination writer
pub mod pipeline;

/// Declarative generator plans
/// Supports JSON and YAML formats (.stencilrc.json, .stencilrc.yml, .stencilrc.yaml)
pub mod plan;

/// Package-manager probing and invocation
pub mod pm;

/// User input and interaction handling
pub mod prompt;

/// File records flowing through pipelines
pub mod record;

/// Template rendering functionality
pub mod renderer;

/// Generator source classification and resolution
pub mod source;

/// Lazy glob expansion into file record streams
pub mod stream;

/// Ephemeral workspace allocation for downloads
pub mod workspace;
