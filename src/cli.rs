//! CLI argument parsing and command dispatch

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::WriteStyle;

use crate::commands;

/// git-versioning - Derive build versions from git branches, tags and commits
#[derive(Parser, Debug)]
#[command(name = "git-versioning")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        env = "GIT_VERSIONING_LOG"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the version resolved for the current repository state
    Resolve(commands::resolve::ResolveArgs),

    /// Write ephemeral descriptors carrying the resolved version
    Attach(commands::attach::AttachArgs),

    /// Remove ephemeral descriptors
    Clean(commands::clean::CleanArgs),

    /// Attach, run a build command, then clean
    Run(commands::run::RunArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        self.init_logging();

        match self.command {
            Commands::Resolve(args) => commands::resolve::execute(args, &self.color),
            Commands::Attach(args) => commands::attach::execute(args, &self.color),
            Commands::Clean(args) => commands::clean::execute(args, &self.color),
            Commands::Run(args) => commands::run::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn init_logging(&self) {
        let write_style = match self.color.to_lowercase().as_str() {
            "always" => WriteStyle::Always,
            "never" => WriteStyle::Never,
            _ => WriteStyle::Auto,
        };
        // Ignore the error from a logger installed earlier in the process.
        let _ = env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .write_style(write_style)
            .format_timestamp(None)
            .try_init();
    }
}
