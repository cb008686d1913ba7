//! # Resolve Command Implementation
//!
//! This module implements the `resolve` subcommand, which prints the version
//! the current repository state resolves to without touching any descriptor.
//!
//! Output is either plain text (the version, optionally followed by one
//! `name=value` line per property) or a JSON object for scripts:
//!
//! ```json
//! {
//!   "version": "feature-login-SNAPSHOT",
//!   "mode": "branch",
//!   "properties": { "git.branch": "feature/login" }
//! }
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use git_versioning::orchestrator;

use super::ProjectArgs;

/// Print the resolved version
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Also print the resolved properties.
    #[arg(short, long)]
    pub properties: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs, _color_flag: &str) -> Result<ExitCode> {
    let resolution = orchestrator::resolve_version(&args.project.options())?;
    let version = &resolution.version;

    if args.json {
        let output = json!({
            "version": version.value,
            "mode": version.mode,
            "properties": version.properties,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", version.value);
    if args.properties {
        for (name, value) in &version.properties {
            println!("{}={}", name, value);
        }
    }
    Ok(ExitCode::SUCCESS)
}
