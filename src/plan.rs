//! Declarative generator plans.
//! A plan file at the source root describes the pipeline runs a
//! generator performs. Supports JSON and YAML formats
//! (.stencilrc.json, .stencilrc.yml, .stencilrc.yaml).

use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Supported plan file names, tried in order at the source root.
pub const CONFIG_FILES: [&str; 3] =
    [".stencilrc.json", ".stencilrc.yml", ".stencilrc.yaml"];

/// One pipeline run declared by a plan.
#[derive(Debug, Deserialize)]
pub struct Run {
    /// Glob patterns expanded against the source root
    pub src: Vec<String>,

    /// Render contents through the template stage
    #[serde(default = "default_template")]
    pub template: bool,

    /// Patch merged into manifest records
    #[serde(default)]
    pub packages: Option<serde_json::Map<String, serde_json::Value>>,

    /// Output folder under the destination root
    #[serde(default)]
    pub dest: Option<String>,
}

fn default_template() -> bool {
    true
}

/// A generator plan: pipeline runs plus post-run helpers.
#[derive(Debug, Deserialize, Default)]
pub struct Plan {
    #[serde(default)]
    pub runs: Vec<Run>,

    /// Install dependencies at the destination after all runs
    #[serde(default)]
    pub install: bool,

    /// Initialize a git repository at the destination after all runs
    #[serde(default)]
    pub git_init: bool,
}

/// Finds a plan file at the source root, trying each supported name.
pub fn find_plan_file<P: AsRef<Path>>(source_root: P) -> Option<PathBuf> {
    for file in CONFIG_FILES {
        let path = source_root.as_ref().join(file);
        if path.exists() {
            debug!("Loading generator plan from {}", path.display());
            return Some(path);
        }
    }
    None
}

/// Parses plan content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content parses as neither
pub fn parse_plan(content: &str) -> Result<Plan> {
    match serde_json::from_str(content) {
        Ok(plan) => Ok(plan),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid plan format: {e}"))),
    }
}

/// Reads and parses the plan file at `path`.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(Error::IoError)?;
    parse_plan(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_yaml() {
        let plan = parse_plan(
            r#"
runs:
  - src: ["**/*"]
    dest: "."
install: true
"#,
        )
        .unwrap();

        assert_eq!(plan.runs.len(), 1);
        assert_eq!(plan.runs[0].src, vec!["**/*"]);
        assert!(plan.runs[0].template);
        assert!(plan.install);
        assert!(!plan.git_init);
    }

    #[test]
    fn test_parse_plan_json() {
        let plan = parse_plan(
            r#"{"runs": [{"src": ["templates/**/*"], "template": false}], "git_init": true}"#,
        )
        .unwrap();

        assert!(!plan.runs[0].template);
        assert!(plan.git_init);
    }

    #[test]
    fn test_parse_plan_rejects_garbage() {
        assert!(parse_plan("runs: [").is_err());
    }
}
