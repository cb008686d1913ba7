//! # Clean Command Implementation
//!
//! This module implements the `clean` subcommand, which removes the
//! ephemeral descriptors of a project graph. It needs no state from the
//! `attach` run: ephemeral paths follow from the descriptor paths.
//!
//! Files that cannot be deleted are reported as warnings; the command still
//! succeeds so that a failed cleanup never fails a build. Only errors that
//! are not recoverable turn into a failing exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_versioning::orchestrator;
use git_versioning::output::{emoji, OutputConfig};

/// Remove ephemeral descriptors
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Project directory containing the root descriptor.
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, color_flag: &str) -> Result<ExitCode> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let report = orchestrator::clean(&args.project_dir)?;

    for path in &report.removed {
        println!("{} Removed {}", emoji(&out, "🧹", "[DEL]"), path.display());
    }
    let mut failed = false;
    for problem in &report.warnings {
        if problem.is_recoverable() {
            eprintln!("{} {}", emoji(&out, "⚠️", "[WARN]"), problem);
        } else {
            eprintln!("{} {}", emoji(&out, "❌", "[ERROR]"), problem);
            failed = true;
        }
    }
    if report.removed.is_empty() && report.is_success() {
        println!("{} Nothing to clean", emoji(&out, "✅", "[OK]"));
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
