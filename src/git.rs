//! Thin wrappers around the system `git` command.
//!
//! Every function here is read-only. They run `git` inside the repository
//! root and translate its output and exit codes into the values the
//! situation reader needs.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run `git` with the given arguments inside `repo`.
///
/// Spawn failures become `Error::GitCommand`; the exit status is left for
/// the caller to interpret because several queries use it as an answer.
fn run_git(repo: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            repo: repo.to_path_buf(),
            stderr: e.to_string(),
        })
}

fn stdout_trimmed(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn command_failed(repo: &Path, args: &[&str], output: &Output) -> Error {
    Error::GitCommand {
        command: args.join(" "),
        repo: repo.to_path_buf(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Find the repository root by walking up from `start`.
///
/// A directory counts as a repository root when it contains a `.git`
/// directory, or a `.git` file as used by worktrees and submodules.
pub fn find_repository_root(start: &Path) -> Result<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };

    let root = start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf);
    root.ok_or(Error::RepositoryNotFound { path: start })
}

/// Resolve the HEAD commit hash.
///
/// Returns `Ok(None)` for an unborn HEAD (a fresh repository without
/// commits) and `Error::RepositoryCorrupt` when HEAD is neither a commit nor
/// a symbolic reference.
pub fn head_commit(repo: &Path) -> Result<Option<String>> {
    let output = run_git(repo, &["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])?;
    if output.status.success() {
        return Ok(Some(stdout_trimmed(&output)));
    }

    // An unborn branch still has a symbolic HEAD.
    let symbolic = run_git(repo, &["symbolic-ref", "--quiet", "HEAD"])?;
    if symbolic.status.success() {
        return Ok(None);
    }

    Err(Error::RepositoryCorrupt {
        path: repo.to_path_buf(),
        message: "HEAD does not resolve to a commit".to_string(),
    })
}

/// Return the checked-out branch name, or `None` when HEAD is detached.
pub fn current_branch(repo: &Path) -> Result<Option<String>> {
    let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
    let output = run_git(repo, &args)?;
    match output.status.code() {
        Some(0) => Ok(Some(stdout_trimmed(&output))),
        // `symbolic-ref --quiet` exits with 1 when HEAD is detached.
        Some(1) => Ok(None),
        _ => Err(command_failed(repo, &args, &output)),
    }
}

/// List the tags pointing exactly at HEAD.
pub fn tags_at_head(repo: &Path) -> Result<Vec<String>> {
    let args = ["tag", "--points-at", "HEAD"];
    let output = run_git(repo, &args)?;
    if !output.status.success() {
        return Err(command_failed(repo, &args, &output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect())
}

/// Returns `true` if tracked files have no uncommitted changes.
///
/// Untracked files do not make the tree dirty.
pub fn is_clean(repo: &Path) -> Result<bool> {
    let args = ["status", "--porcelain", "--untracked-files=no"];
    let output = run_git(repo, &args)?;
    if !output.status.success() {
        return Err(command_failed(repo, &args, &output));
    }
    Ok(output.stdout.iter().all(u8::is_ascii_whitespace))
}

/// Describe HEAD relative to the nearest tag, e.g. `v1.2.0-3-gabcdef0`.
///
/// Returns `None` when the repository has no reachable tags.
pub fn describe(repo: &Path) -> Result<Option<String>> {
    let output = run_git(repo, &["describe", "--tags", "--long"])?;
    if output.status.success() {
        Ok(Some(stdout_trimmed(&output)))
    } else {
        Ok(None)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{commit_empty, init_repo, run_git};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_repository_root_from_subdirectory() {
        let repo = init_repo();
        let nested = repo.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let root = find_repository_root(&nested).unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_find_repository_root_outside_repository() {
        let temp_dir = TempDir::new().unwrap();
        // Temp directories are not expected to sit inside a git checkout.
        if temp_dir.path().ancestors().any(|d| d.join(".git").exists()) {
            return;
        }
        let result = find_repository_root(temp_dir.path());
        assert!(matches!(result, Err(Error::RepositoryNotFound { .. })));
    }

    #[test]
    fn test_unborn_head_has_no_commit() {
        let repo = init_repo();
        assert_eq!(head_commit(repo.path()).unwrap(), None);
    }

    #[test]
    fn test_head_commit_returns_40_hex_chars() {
        let repo = init_repo();
        let sha = commit_empty(repo.path(), "initial");

        let head = head_commit(repo.path()).unwrap().unwrap();
        assert_eq!(head, sha);
        assert_eq!(head.len(), 40);
        assert!(head.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_current_branch_and_detached_head() {
        let repo = init_repo();
        commit_empty(repo.path(), "initial");
        run_git(repo.path(), &["checkout", "--quiet", "-b", "feature/test"]);
        assert_eq!(
            current_branch(repo.path()).unwrap().as_deref(),
            Some("feature/test")
        );

        run_git(repo.path(), &["checkout", "--quiet", "--detach"]);
        assert_eq!(current_branch(repo.path()).unwrap(), None);
    }

    #[test]
    fn test_tags_at_head_and_describe() {
        let repo = init_repo();
        commit_empty(repo.path(), "initial");
        assert!(tags_at_head(repo.path()).unwrap().is_empty());
        assert_eq!(describe(repo.path()).unwrap(), None);

        run_git(repo.path(), &["tag", "v1"]);
        run_git(repo.path(), &["tag", "release-1"]);
        let tags = tags_at_head(repo.path()).unwrap();
        assert_eq!(tags, vec!["release-1".to_string(), "v1".to_string()]);

        commit_empty(repo.path(), "second");
        assert!(tags_at_head(repo.path()).unwrap().is_empty());
        let description = describe(repo.path()).unwrap().unwrap();
        assert!(description.contains("-1-g"), "got {}", description);
    }

    #[test]
    fn test_is_clean_ignores_untracked_files() {
        let repo = init_repo();
        fs::write(repo.path().join("tracked.txt"), "one").unwrap();
        run_git(repo.path(), &["add", "tracked.txt"]);
        commit_empty(repo.path(), "initial");

        fs::write(repo.path().join("untracked.txt"), "new").unwrap();
        assert!(is_clean(repo.path()).unwrap());

        fs::write(repo.path().join("tracked.txt"), "two").unwrap();
        assert!(!is_clean(repo.path()).unwrap());
    }
}
