//! Interactive confirmation gate backed by dialoguer.

use dialoguer::Confirm;
use netrefit_core::ConfirmationGate;

/// Prompts on the terminal unless `--yes` was passed.
#[derive(Debug, Clone, Copy)]
pub struct PromptGate {
    assume_yes: bool,
}

impl PromptGate {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmationGate for PromptGate {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
