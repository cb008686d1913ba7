//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `git-versioning` command-line tool. Each subcommand is defined in its own
//! file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, returning the process exit code.
//!
//! Commands that resolve a version share [`ProjectArgs`], which also carries
//! the CI overrides read from the environment.

pub mod attach;
pub mod clean;
pub mod completions;
pub mod resolve;
pub mod run;

use std::path::PathBuf;

use clap::Args;

use git_versioning::orchestrator::Options;
use git_versioning::repository::SituationOverrides;

/// Arguments shared by every command that resolves a version.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project directory containing the root descriptor.
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Configuration file to use instead of `.git-versioning.yaml` in the
    /// project directory.
    #[arg(long, value_name = "FILE", env = "GIT_VERSIONING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Branch to resolve for, instead of the checked-out branch.
    ///
    /// CI systems usually build a detached HEAD; pass the branch they report.
    #[arg(long, value_name = "NAME", env = "GIT_VERSIONING_BRANCH")]
    pub branch: Option<String>,

    /// Tag to resolve for, instead of the tags at HEAD.
    #[arg(long, value_name = "NAME", env = "GIT_VERSIONING_TAG")]
    pub tag: Option<String>,

    /// Disable versioning for this invocation.
    #[arg(long, env = "GIT_VERSIONING_DISABLE")]
    pub disable: bool,
}

impl ProjectArgs {
    pub fn options(&self) -> Options {
        Options {
            project_dir: self.project_dir.clone(),
            config: self.config.clone(),
            overrides: SituationOverrides {
                branch: self.branch.clone(),
                tag: self.tag.clone(),
            },
            disable: self.disable,
        }
    }
}
