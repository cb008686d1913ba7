//! # Attach Command Implementation
//!
//! This module implements the `attach` subcommand, the hook a build host runs
//! before building. It resolves the version, writes an ephemeral descriptor
//! next to every descriptor of the project graph and leaves them in place
//! for the build. Run `clean` afterwards to remove them.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_versioning::lifecycle::AttachOutcome;
use git_versioning::orchestrator;
use git_versioning::output::{emoji, highlight, OutputConfig};

use super::ProjectArgs;

/// Write ephemeral descriptors
#[derive(Args, Debug)]
pub struct AttachArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Execute the `attach` command.
pub fn execute(args: AttachArgs, color_flag: &str) -> Result<ExitCode> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let attachment = orchestrator::attach(&args.project.options(), true)?;
    let version = &attachment.resolution.version.value;

    match attachment.outcome {
        Some(AttachOutcome::Attached(count)) => {
            println!(
                "{} Attached version {} to {} descriptor(s)",
                emoji(&out, "✅", "[OK]"),
                highlight(&out, version),
                count
            );
            for registration in attachment.session.registrations()? {
                println!("   {}", registration.path.display());
            }
        }
        Some(AttachOutcome::SkippedNonRoot) | Some(AttachOutcome::AlreadyAttached) => {}
        None => {
            println!(
                "{} Versioning is disabled, descriptors left untouched",
                emoji(&out, "ℹ️", "[INFO]")
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
