//! # Run Command Implementation
//!
//! This module implements the `run` subcommand, which wraps a build:
//!
//! 1. resolve the version and attach ephemeral descriptors;
//! 2. run the given command with `GIT_VERSIONING_VERSION` and
//!    `GIT_VERSIONING_DESCRIPTOR` exported;
//! 3. remove the ephemeral descriptors, whatever the command's outcome.
//!
//! The exit code of the command becomes the exit code of `git-versioning`.
//!
//! ```bash
//! git-versioning run -- sh -c 'mvn -f "$GIT_VERSIONING_DESCRIPTOR" package'
//! ```

use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use log::{debug, warn};

use git_versioning::orchestrator;

use super::ProjectArgs;

/// Environment variable carrying the resolved version.
pub const VERSION_ENV: &str = "GIT_VERSIONING_VERSION";

/// Environment variable carrying the root descriptor the build should read.
pub const DESCRIPTOR_ENV: &str = "GIT_VERSIONING_DESCRIPTOR";

/// Attach, run a command, then clean
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// The build command and its arguments.
    #[arg(trailing_var_arg = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Execute the `run` command.
pub fn execute(args: RunArgs, _color_flag: &str) -> Result<ExitCode> {
    let Some((program, program_args)) = args.command.split_first() else {
        anyhow::bail!("No command given");
    };

    let attachment = orchestrator::attach(&args.project.options(), false)?;
    let descriptor = attachment.root_descriptor()?;
    debug!("Running {} with descriptor {}", program, descriptor.display());

    let status = Command::new(program)
        .args(program_args)
        .current_dir(&args.project.project_dir)
        .env(VERSION_ENV, &attachment.resolution.version.value)
        .env(DESCRIPTOR_ENV, &descriptor)
        .status()
        .with_context(|| format!("Failed to run '{}'", program));

    let report = attachment.session.clean_all()?;
    if !report.is_success() {
        warn!(
            "{} ephemeral descriptor(s) could not be removed",
            report.warnings.len()
        );
    }

    let status = status?;
    Ok(match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}
