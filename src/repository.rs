//! # Repository Situation Reader
//!
//! This module turns the state of a git working copy into an immutable
//! [`RepoSituation`]. It is built around a trait-based design that separates
//! the reading logic from the concrete git implementation:
//!
//! - **`GitOperations`**: the narrow, read-only interface the reader needs
//!   (current branch, tags at HEAD, HEAD commit, cleanliness, describe).
//!
//! - **`DefaultGitOperations`**: the production implementation, which wraps
//!   the system `git` command through the `git` module.
//!
//! - **`SituationReader`**: combines the answers into a `RepoSituation`.
//!
//! Tests swap in their own `GitOperations` to simulate detached heads,
//! unborn branches and dirty trees without creating repositories.
//!
//! CI systems usually check out a detached HEAD. [`SituationOverrides`]
//! lets the caller supply the branch or tag explicitly; overrides are applied
//! to the snapshot before resolution.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::situation::RepoSituation;

/// Trait for read-only git queries - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// The checked-out branch, or `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<String>>;

    /// All tags pointing exactly at HEAD.
    fn tags_at_head(&self) -> Result<Vec<String>>;

    /// The full HEAD commit hash, or `None` for an unborn HEAD.
    fn head_commit_hash(&self) -> Result<Option<String>>;

    /// Whether tracked files are free of uncommitted changes.
    fn is_working_tree_clean(&self) -> Result<bool>;

    /// Nearest-tag description of HEAD, or `None` when no tag is reachable.
    fn describe(&self) -> Result<Option<String>>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command inside a discovered repository root.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    repo_root: PathBuf,
}

impl DefaultGitOperations {
    /// Discovers the repository containing `start`.
    ///
    /// # Errors
    ///
    /// Returns `Error::RepositoryNotFound` if no `.git` entry exists in
    /// `start` or any of its ancestors.
    pub fn discover(start: &Path) -> Result<Self> {
        let repo_root = crate::git::find_repository_root(start)?;
        debug!("Using git repository at {}", repo_root.display());
        Ok(Self { repo_root })
    }
}

impl GitOperations for DefaultGitOperations {
    fn current_branch(&self) -> Result<Option<String>> {
        crate::git::current_branch(&self.repo_root)
    }

    fn tags_at_head(&self) -> Result<Vec<String>> {
        crate::git::tags_at_head(&self.repo_root)
    }

    fn head_commit_hash(&self) -> Result<Option<String>> {
        crate::git::head_commit(&self.repo_root)
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        crate::git::is_clean(&self.repo_root)
    }

    fn describe(&self) -> Result<Option<String>> {
        crate::git::describe(&self.repo_root)
    }
}

/// Explicit branch or tag supplied by the caller, typically from CI
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SituationOverrides {
    /// Replaces the checked-out branch.
    pub branch: Option<String>,
    /// Replaces the tags at HEAD with this single tag.
    pub tag: Option<String>,
}

impl SituationOverrides {
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.tag.is_none()
    }

    /// Applies the overrides to a situation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if an override is an empty string.
    pub fn apply(&self, situation: &mut RepoSituation) -> Result<()> {
        if let Some(branch) = &self.branch {
            debug!("Overriding branch with '{}'", branch);
            situation.set_head_branch(Some(branch.clone()))?;
        }
        if let Some(tag) = &self.tag {
            debug!("Overriding tags with '{}'", tag);
            situation.set_head_tags(vec![tag.clone()])?;
        }
        Ok(())
    }
}

/// Reads a [`RepoSituation`] through a [`GitOperations`] implementation.
pub struct SituationReader {
    git_ops: Box<dyn GitOperations>,
}

impl SituationReader {
    /// Creates a reader for the repository containing `repo_root`, using the
    /// system `git` command.
    pub fn new(repo_root: &Path) -> Result<Self> {
        Ok(Self {
            git_ops: Box::new(DefaultGitOperations::discover(repo_root)?),
        })
    }

    /// Creates a reader with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Reads the current situation.
    ///
    /// An unborn HEAD yields the default "no commit" situation. A detached
    /// HEAD yields no branch.
    pub fn read(&self) -> Result<RepoSituation> {
        let Some(head_commit) = self.git_ops.head_commit_hash()? else {
            debug!("HEAD is unborn, using the no-commit situation");
            return Ok(RepoSituation::default());
        };

        let situation = RepoSituation::new(
            self.git_ops.is_working_tree_clean()?,
            head_commit,
            self.git_ops.current_branch()?,
            self.git_ops.tags_at_head()?,
            self.git_ops.describe()?,
        )?;

        debug!(
            "Read situation: commit={} branch={:?} tags={:?} clean={}",
            situation.head_commit(),
            situation.head_branch(),
            situation.head_tags(),
            situation.is_clean()
        );
        Ok(situation)
    }
}

/// Reads the situation of the repository containing `repo_root`.
///
/// # Errors
///
/// Returns `Error::RepositoryNotFound` when no repository is found and
/// `Error::RepositoryCorrupt` when HEAD cannot be resolved.
pub fn read(repo_root: &Path) -> Result<RepoSituation> {
    SituationReader::new(repo_root)?.read()
}
