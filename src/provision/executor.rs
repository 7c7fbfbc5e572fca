use std::process::Command;

use crate::ui::prelude::*;

use super::error::{ProvisionError, Result};

/// Runs account-management tools, or only reports them in dry-run mode.
#[derive(Clone, Copy)]
pub struct CommandExecutor<'a> {
    pub dry_run: bool,
    diag: &'a dyn Diagnostics,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(dry_run: bool, diag: &'a dyn Diagnostics) -> Self {
        Self { dry_run, diag }
    }

    /// Reports a change that dry-run mode skipped, on the regular log stream.
    pub fn report_dry_run(&self, action: &str) {
        self.diag
            .info("provision.dry_run", &format!("[DRY RUN] {}", action));
    }

    /// Blocks until the tool exits. A non-zero status becomes `ProvisionError::Tool`.
    pub fn run(&self, command: &mut Command) -> Result<()> {
        if self.dry_run {
            self.report_dry_run(&command_line(command));
            return Ok(());
        }

        let program = command.get_program().to_string_lossy().into_owned();
        self.diag
            .debug("provision.command", &format!("Running {}", command_line(command)));
        let status = command.status().map_err(|source| ProvisionError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ProvisionError::Tool {
                program,
                args: args_of(command),
                code: status.code(),
            });
        }

        Ok(())
    }
}

pub fn args_of(command: &Command) -> Vec<String> {
    command
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

pub fn command_line(command: &Command) -> String {
    let program = command.get_program().to_string_lossy();
    let args = args_of(command);
    if args.is_empty() {
        program.into_owned()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
