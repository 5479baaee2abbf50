//! User interaction handling behind a trait seam, so tests and embedders
//! can substitute their own answers.

use crate::error::{Error, Result};
use dialoguer::{Confirm, Input};

/// Trait for interactive prompts exposed to generators.
pub trait Prompter {
    /// Asks a yes/no question. When `skip` is set the question is not
    /// shown and the answer is yes.
    fn confirm(&self, skip: bool, message: String) -> Result<bool>;

    /// Asks for a line of text, with an optional default.
    fn input(&self, message: String, default: Option<String>) -> Result<String>;
}

/// Dialoguer-backed prompter used by the CLI.
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        DialoguerPrompter::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, message: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }

    fn input(&self, message: String, default: Option<String>) -> Result<String> {
        let mut input = Input::new().with_prompt(message);
        if let Some(default) = default {
            input = input.default(default);
        }
        input.interact_text().map_err(|e| Error::PromptError(e.to_string()))
    }
}
