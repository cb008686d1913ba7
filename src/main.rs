//! # git-versioning CLI
//!
//! This is the binary entry point for the `git-versioning` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating errors and the exit status of wrapped build commands into
//!   the process exit code.
//!
//! Version resolution and descriptor handling live in the library crate; the
//! binary only wires them to the command line.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
