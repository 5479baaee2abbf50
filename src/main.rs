//! stencil's main application entry point and orchestration logic.
//! Parses command-line arguments, loads the generator, and invokes it
//! with the capability surface and run context.

use stencil::{
    api::Overrides,
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    generator::load,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Off
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Validates arguments and resolves the generator source
/// 2. Invokes the loaded generator with the capability surface
///    and the run context
fn run(args: Args) -> Result<()> {
    let run = load(
        args.generator.as_deref(),
        args.output_dir.as_deref(),
        args.argv,
        args.clone,
        Overrides::default(),
    )?;

    run.generator.generate(&run.api, &run.context)?;

    println!("Project generated successfully in {}.", run.context.path.display());
    Ok(())
}
