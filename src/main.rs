mod provision;
mod ui;

use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

use crate::provision::privileges;
use crate::provision::{
    Manifest, MembershipMode, ProvisionError, Provisioner, RunSummary, SystemHost,
};
use crate::ui::prelude::*;

/// Create the science users, group and shared directory on this host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print the account and filesystem changes instead of making them
    #[arg(long)]
    dry_run: bool,

    /// Replace each user's supplementary groups instead of appending to them
    #[arg(long)]
    exact_groups: bool,

    /// Show debug output
    #[arg(short, long)]
    debug: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Cli {
    fn membership_mode(&self) -> MembershipMode {
        if self.exact_groups {
            MembershipMode::Exact
        } else {
            MembershipMode::Append
        }
    }
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_status(&err));
        }
    };
    let terminal = Terminal::new(cli.format, std::io::stderr().is_terminal(), cli.debug);

    if let Err(err) = privileges::require_elevated_privilege() {
        terminal.error("provision.privilege", &err.to_string());
        return ExitCode::from(EXIT_FAILURE);
    }

    ExitCode::from(report(provision_host(&cli, &terminal), &terminal))
}

/// `--help` and `--version` exit cleanly; every other parse error is a failure.
fn parse_error_status(err: &clap::Error) -> u8 {
    if err.exit_code() == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

fn report(outcome: Result<RunSummary, ProvisionError>, diag: &dyn Diagnostics) -> u8 {
    match outcome {
        Ok(summary) => {
            diag.info("provision.done", &describe(&summary));
            EXIT_SUCCESS
        }
        Err(err) => {
            diag.error("provision.failed", &format!("An error occurred: {}", err));
            EXIT_FAILURE
        }
    }
}

fn provision_host(cli: &Cli, diag: &dyn Diagnostics) -> Result<RunSummary, ProvisionError> {
    if cli.dry_run {
        diag.info(
            "provision.dry_run",
            "*** DRY RUN MODE ENABLED - No changes will be made ***",
        );
    }

    let host = SystemHost::new(cli.dry_run, diag);
    Provisioner::new(&host, diag)
        .with_membership_mode(cli.membership_mode())
        .run(&Manifest::SCIENCE)
}

fn describe(summary: &RunSummary) -> String {
    let users = if summary.users_created.is_empty() {
        "none".to_string()
    } else {
        summary.users_created.join(", ")
    };
    format!(
        "Provisioning finished: users created: {}; group created: {}; memberships applied: {}; directory created: {}",
        users,
        yes_no(summary.group_created),
        summary.memberships_applied,
        yes_no(summary.directory_created)
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
