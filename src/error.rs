//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `git-versioning` library. It uses the `thiserror` library to create a
//! single `Error` enum that covers every anticipated failure mode, with
//! enough context in each variant to point the user at the fix.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the crate.
//!
//! ## Fatal and recoverable errors
//!
//! Almost every variant aborts the build step it occurs in. Repository errors
//! (`RepositoryNotFound`, `RepositoryCorrupt`) abort before any version is
//! resolved, and configuration errors (`UnresolvedPlaceholder`, `Template`,
//! `ConfigParse`) abort before any ephemeral descriptor is written.
//!
//! `CleanupFailed` is the only recoverable variant: it is reported as a
//! warning and the clean continues with the remaining projects. Use
//! [`Error::is_recoverable`] to tell the two apart.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for git-versioning operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value handed to a constructor or setter violated its invariant.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// No `.git` entry was found in the given directory or any ancestor.
    #[error("Git repository not found from {}", path.display())]
    RepositoryNotFound { path: PathBuf },

    /// HEAD exists but could not be resolved to a commit or an unborn branch.
    #[error("Git repository at {} is corrupt: {message}", path.display())]
    RepositoryCorrupt { path: PathBuf, message: String },

    /// The `git` executable could not be run or exited unexpectedly.
    #[error("Git command failed in {}: {command} - {stderr}", repo.display())]
    GitCommand {
        command: String,
        repo: PathBuf,
        stderr: String,
    },

    /// An error occurred while parsing the `.git-versioning.yaml` configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A version or property template is syntactically malformed.
    ///
    /// May include the name of the problematic placeholder when applicable.
    #[error("Template processing error: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The template placeholder that caused the error, if applicable
        variable: Option<String>,
    },

    /// A template references a placeholder that has no value.
    #[error("Unresolved placeholder '${{{placeholder}}}' in template \"{template}\"")]
    UnresolvedPlaceholder {
        placeholder: String,
        template: String,
    },

    /// A project descriptor could not be read, parsed or written.
    #[error("Descriptor error for {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    /// Module declarations form a cycle.
    #[error("Cycle detected in project modules: {cycle}")]
    CycleDetected { cycle: String },

    /// A descriptor could not be rewritten with its resolved version.
    #[error("Descriptor rewrite error for {project}: {message}")]
    Rewrite { project: String, message: String },

    /// Projects of one graph resolved to different versions.
    #[error("Projects resolved to divergent versions: {details}")]
    VersionDivergence { details: String },

    /// An ephemeral descriptor could not be removed.
    #[error("Cleanup failed for {}: {message}", path.display())]
    CleanupFailed { path: PathBuf, message: String },

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Returns `true` for errors that are reported as warnings instead of
    /// aborting the current operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::CleanupFailed { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
