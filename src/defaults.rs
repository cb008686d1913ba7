//! Default values and well-known names for git-versioning.
//!
//! This module provides centralized constants used across the library and the
//! commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = ".git-versioning.yaml";

/// Descriptor file names recognised in a project or module directory, in
/// lookup order.
pub const DESCRIPTOR_FILE_NAMES: [&str; 3] = ["pom.yaml", "pom.yml", "pom.json"];

/// Prefix of ephemeral descriptor files written next to their source.
pub const EPHEMERAL_PREFIX: &str = ".git-versioned.";

/// Commit hash used when the repository carries no commit information.
///
/// This is also the version reported when no rule applies, so builds
/// without git metadata stay reproducible.
pub const NO_COMMIT: &str = "0000000000000000000000000000000000000000";

/// Suffix appended to versions resolved from a dirty working tree.
pub const DEFAULT_DIRTY_SUFFIX: &str = "-dirty";

/// Group id under which this tool registers itself as a build plugin.
pub const PLUGIN_GROUP_ID: &str = "io.github.git-versioning";

/// Artifact id under which this tool registers itself as a build plugin.
pub const PLUGIN_ARTIFACT_ID: &str = "git-versioning";

/// Returns the ephemeral descriptor path for a source descriptor.
///
/// The ephemeral file lives in the same directory, so relative paths inside
/// the descriptor (module paths, parent relative paths) keep working.
///
/// # Examples
///
/// ```
/// use git_versioning::defaults::ephemeral_path;
/// use std::path::Path;
///
/// let path = ephemeral_path(Path::new("api/pom.yaml"));
/// assert_eq!(path, Path::new("api/.git-versioned.pom.yaml"));
/// ```
pub fn ephemeral_path(descriptor: &Path) -> PathBuf {
    let file_name = descriptor
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DESCRIPTOR_FILE_NAMES[0].to_string());
    descriptor.with_file_name(format!("{}{}", EPHEMERAL_PREFIX, file_name))
}

/// Finds the descriptor file inside `dir`, if any.
pub fn find_descriptor(dir: &Path) -> Option<PathBuf> {
    DESCRIPTOR_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
