//! Shared helpers for command handlers.

use std::io::IsTerminal;

use dialoguer::{Confirm, Select};

use crate::error::CliError;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal and without `--yes`, destructive actions refuse to run.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Pick one of `items` interactively; `what` names the choice for errors.
pub fn select(prompt: &str, what: &str, items: &[String]) -> Result<usize, CliError> {
    if items.is_empty() {
        return Err(CliError::NotFound {
            resource_type: what.into(),
            identifier: "(any)".into(),
            list_command: format!("{what}s list"),
        });
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: what.into(),
            reason: format!("no {what} given and no terminal to choose one; pass --{what}"),
        });
    }
    Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
        .map_err(prompt_err)
}
