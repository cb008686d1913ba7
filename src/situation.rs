//! # Repository Situation
//!
//! A `RepoSituation` is the snapshot of git state that version resolution
//! works from: whether the working tree is clean, the HEAD commit, the
//! checked-out branch, the tags at HEAD and the `git describe` output.
//!
//! The record has no behaviour beyond validation. Every setter validates its
//! field, so a situation can never hold a malformed commit hash or an empty
//! branch or tag name.

use crate::defaults::NO_COMMIT;
use crate::error::{Error, Result};

/// Snapshot of the repository state at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSituation {
    clean: bool,
    head_commit: String,
    head_branch: Option<String>,
    head_tags: Vec<String>,
    head_describe: Option<String>,
}

impl RepoSituation {
    /// Creates a situation, validating every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `head_commit` is not a 40 character
    /// hexadecimal hash, or if the branch or any tag is an empty string.
    pub fn new(
        clean: bool,
        head_commit: impl Into<String>,
        head_branch: Option<String>,
        head_tags: Vec<String>,
        head_describe: Option<String>,
    ) -> Result<Self> {
        let mut situation = Self::default();
        situation.set_clean(clean);
        situation.set_head_commit(head_commit)?;
        situation.set_head_branch(head_branch)?;
        situation.set_head_tags(head_tags)?;
        situation.set_head_describe(head_describe);
        Ok(situation)
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    pub fn head_commit(&self) -> &str {
        &self.head_commit
    }

    /// Sets the HEAD commit hash.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` unless the hash is exactly 40
    /// hexadecimal characters.
    pub fn set_head_commit(&mut self, head_commit: impl Into<String>) -> Result<()> {
        let head_commit = head_commit.into();
        if head_commit.len() != 40 {
            return Err(Error::InvalidArgument {
                message: format!(
                    "head commit hash must consist of 40 hex characters, got {} characters",
                    head_commit.len()
                ),
            });
        }
        if !head_commit.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidArgument {
                message: format!("head commit hash '{}' is not hexadecimal", head_commit),
            });
        }
        self.head_commit = head_commit;
        Ok(())
    }

    /// Returns `true` if the situation carries a real commit.
    pub fn has_commit(&self) -> bool {
        self.head_commit != NO_COMMIT
    }

    /// The checked-out branch, `None` when HEAD is detached.
    pub fn head_branch(&self) -> Option<&str> {
        self.head_branch.as_deref()
    }

    pub fn set_head_branch(&mut self, head_branch: Option<String>) -> Result<()> {
        if head_branch.as_deref().is_some_and(str::is_empty) {
            return Err(Error::InvalidArgument {
                message: "head branch name must not be empty".to_string(),
            });
        }
        self.head_branch = head_branch;
        Ok(())
    }

    /// Tags pointing exactly at HEAD, in the order git reported them.
    pub fn head_tags(&self) -> &[String] {
        &self.head_tags
    }

    pub fn set_head_tags(&mut self, head_tags: Vec<String>) -> Result<()> {
        if head_tags.iter().any(String::is_empty) {
            return Err(Error::InvalidArgument {
                message: "head tag names must not be empty".to_string(),
            });
        }
        self.head_tags = head_tags;
        Ok(())
    }

    pub fn head_describe(&self) -> Option<&str> {
        self.head_describe.as_deref()
    }

    pub fn set_head_describe(&mut self, head_describe: Option<String>) {
        self.head_describe = head_describe;
    }
}

impl Default for RepoSituation {
    /// The "no commit" situation of a repository without history.
    fn default() -> Self {
        Self {
            clean: true,
            head_commit: NO_COMMIT.to_string(),
            head_branch: None,
            head_tags: Vec::new(),
            head_describe: None,
        }
    }
}
