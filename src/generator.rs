//! Generator loading and orchestration.
//!
//! The loader runs a straight line: validate arguments, resolve the
//! source, derive the destination and project name, build the
//! capability surface and context, apply overrides, and pick the
//! generator. Errors raised by the chosen generator are not caught
//! here; they belong to the run's caller.

use crate::api::{Api, Context, Overrides};
use crate::error::{Error, Result};
use crate::pipeline::Stage;
use crate::plan::{self, Plan};
use crate::source::{resolve_source, ResolvedSource};
use std::path::Path;

/// A callable generator: anything accepting the capability surface and
/// the run context. The loader assumes nothing about its behavior.
pub trait Generator {
    fn generate(&self, api: &Api, context: &Context) -> Result<()>;
}

/// Everything needed to execute one run.
pub struct LoadedRun {
    pub generator: Box<dyn Generator>,
    pub api: Api,
    pub context: Context,
    pub source: ResolvedSource,
}

/// Loads a generator run.
///
/// Both positional arguments are validated before any filesystem or
/// process interaction occurs. Overrides are merged onto the surface
/// and context before the plan file is looked up, so an override of the
/// source root also redirects plan discovery.
///
/// # Errors
/// * `Error::MissingGeneratorError` / `Error::MissingDirectoryError` if
///   a positional argument is absent
pub fn load(
    generator_ref: Option<&str>,
    output_dir: Option<&Path>,
    argv: Vec<String>,
    clone: bool,
    overrides: Overrides,
) -> Result<LoadedRun> {
    let generator_ref = generator_ref.ok_or(Error::MissingGeneratorError)?;
    let output_dir = output_dir.ok_or(Error::MissingDirectoryError)?;

    let source = resolve_source(generator_ref, clone)?;

    let dest_root = if output_dir.is_absolute() {
        output_dir.to_path_buf()
    } else {
        std::env::current_dir().map_err(Error::IoError)?.join(output_dir)
    };
    let name = project_name(&dest_root);

    let mut api = Api::new(source.path.clone(), dest_root.clone());
    let mut context = Context { path: dest_root, name, argv };
    overrides.apply(&mut api, &mut context);

    let generator: Box<dyn Generator> = match plan::find_plan_file(api.source_root()) {
        Some(path) => Box::new(PlanGenerator::new(plan::load_plan(path)?)),
        None => Box::new(DefaultGenerator),
    };

    Ok(LoadedRun { generator, api, context, source })
}

/// Derives the project name from the destination's final path segment.
fn project_name(dest: &Path) -> String {
    dest.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dest.display().to_string())
}

/// Built-in generator used when the source declares no plan: copies the
/// source tree through ignore → metadata → template → dest.
pub struct DefaultGenerator;

impl Generator for DefaultGenerator {
    fn generate(&self, api: &Api, context: &Context) -> Result<()> {
        let stream = api.src(["**/*"])?;
        let stages: Vec<Box<dyn Stage + '_>> = vec![
            Box::new(api.ignore()?),
            Box::new(api.metadata(context)),
            Box::new(api.template(context)),
            Box::new(api.dest(None)),
        ];
        api.pipeline(stream, stages)
    }
}

/// Interprets a declarative plan: one pipeline per declared run, then
/// the install and git-init helpers.
pub struct PlanGenerator {
    plan: Plan,
}

impl PlanGenerator {
    pub fn new(plan: Plan) -> Self {
        Self { plan }
    }
}

impl Generator for PlanGenerator {
    fn generate(&self, api: &Api, context: &Context) -> Result<()> {
        for run in &self.plan.runs {
            let stream = api.src(&run.src)?;

            let mut stages: Vec<Box<dyn Stage + '_>> = vec![
                Box::new(api.ignore()?),
                Box::new(api.metadata(context)),
            ];
            if run.template {
                stages.push(Box::new(api.template(context)));
            }
            if let Some(patch) = &run.packages {
                stages.push(Box::new(api.packages(patch.clone())));
            }
            stages.push(Box::new(api.dest(run.dest.as_deref())));

            api.pipeline(stream, stages)?;
        }

        if self.plan.install {
            api.install()?;
        }
        if self.plan.git_init {
            api.git_init()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name() {
        assert_eq!(project_name(Path::new("/tmp/projects/my-app")), "my-app");
        assert_eq!(project_name(Path::new("my-app")), "my-app");
    }
}
