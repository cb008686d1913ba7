//! # Ephemeral Descriptor Lifecycle
//!
//! A build never sees the checked-in descriptors with their placeholder
//! versions. Instead, [`BuildSession::attach`] writes a rewritten copy of
//! every descriptor of the graph next to its source, as
//! `.git-versioned.<file name>`, and registers it as the project's
//! effective descriptor. [`BuildSession::clean`] removes it again.
//!
//! ## States
//!
//! Per project there is at most one registration:
//!
//! - **Absent → Attached**: `attach` for the root context. Rewriting happens
//!   for the whole graph before the first file is written, so a fatal
//!   rewrite error leaves nothing behind. Each file is written atomically
//!   and replaces any stale file from an earlier, interrupted build.
//! - **Attached → Absent**: `clean`, or dropping the session unless it was
//!   told to keep its files.
//!
//! Files from an earlier process can be removed without session state with
//! [`clean_graph`], because ephemeral paths are derived from source paths.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::defaults::{ephemeral_path, PLUGIN_ARTIFACT_ID, PLUGIN_GROUP_ID};
use crate::descriptor::graph::ProjectGraph;
use crate::descriptor::{marshal, ProjectId};
use crate::error::{Error, Result};
use crate::resolver::ResolvedVersion;
use crate::rewrite::{rewrite_with, RewriteOptions};

/// Result of an attach request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// Ephemeral descriptors were written for this many projects.
    Attached(usize),
    /// The request came from a module rather than the root project.
    SkippedNonRoot,
    /// The session was attached before.
    AlreadyAttached,
}

/// An ephemeral descriptor registered for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub project: ProjectId,
    pub path: PathBuf,
}

/// Paths removed by a clean and the failures met on the way.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<Error>,
}

impl CleanReport {
    pub fn is_success(&self) -> bool {
        self.warnings.is_empty()
    }

    fn record(&mut self, path: PathBuf, outcome: Result<bool>) {
        match outcome {
            Ok(true) => self.removed.push(path),
            Ok(false) => {}
            Err(e) => {
                warn!("{}", e);
                self.warnings.push(e);
            }
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    attached: bool,
    registrations: BTreeMap<ProjectId, PathBuf>,
}

/// Ephemeral descriptor state of one build.
#[derive(Debug)]
pub struct BuildSession {
    root: ProjectId,
    keep_on_exit: bool,
    state: Mutex<SessionState>,
}

impl BuildSession {
    /// Creates a session for the build rooted at `root`.
    pub fn new(root: ProjectId) -> Self {
        Self {
            root,
            keep_on_exit: false,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Keeps the ephemeral files when the session is dropped.
    pub fn keep_on_exit(mut self, keep: bool) -> Self {
        self.keep_on_exit = keep;
        self
    }

    pub fn root(&self) -> &ProjectId {
        &self.root
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|_| Error::LockPoisoned {
            context: "build session".to_string(),
        })
    }

    /// Writes and registers ephemeral descriptors for the whole graph.
    ///
    /// Only the root context attaches, and only once per session; every
    /// other call returns without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `graph` is rooted at another
    /// project than the session. Rewrite errors are returned before anything
    /// is written. If a write fails, files written by this call are removed
    /// before the error is returned.
    pub fn attach(
        &self,
        context: &ProjectId,
        graph: &ProjectGraph,
        resolved: &HashMap<ProjectId, ResolvedVersion>,
        options: &RewriteOptions,
    ) -> Result<AttachOutcome> {
        if context != &self.root {
            debug!("Skipping attach for non-root project {}", context);
            return Ok(AttachOutcome::SkippedNonRoot);
        }

        if graph.root().id != self.root {
            return Err(Error::InvalidArgument {
                message: format!(
                    "graph rooted at {} does not belong to the build session of {}",
                    graph.root().id,
                    self.root
                ),
            });
        }

        let mut state = self.lock()?;
        if state.attached {
            debug!("Build session is already attached");
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let mut rewritten = rewrite_with(&graph.descriptors(), resolved, options)?;
        if let Some(root) = rewritten.first_mut() {
            if root.remove_plugin(PLUGIN_GROUP_ID, PLUGIN_ARTIFACT_ID) {
                debug!("Removed plugin registration from {}", self.root);
            }
        }

        let mut written: Vec<(ProjectId, PathBuf)> = Vec::with_capacity(rewritten.len());
        for (project, descriptor) in graph.projects().iter().zip(&rewritten) {
            let path = ephemeral_path(&project.path);
            if let Err(e) = marshal::serialize(descriptor, &path) {
                for (_, done) in &written {
                    if let Err(cleanup) = remove_ephemeral(done) {
                        warn!("{}", cleanup);
                    }
                }
                return Err(e);
            }
            debug!("Wrote {}", path.display());
            written.push((project.id.clone(), path));
        }

        let count = written.len();
        state.registrations.extend(written);
        state.attached = true;
        info!("Attached {} ephemeral descriptor(s)", count);
        Ok(AttachOutcome::Attached(count))
    }

    pub fn is_attached(&self) -> Result<bool> {
        Ok(self.lock()?.attached)
    }

    /// The descriptor the build should use for `project`, if one is
    /// registered.
    pub fn effective_descriptor(&self, project: &ProjectId) -> Result<Option<PathBuf>> {
        Ok(self.lock()?.registrations.get(project).cloned())
    }

    pub fn registrations(&self) -> Result<Vec<Registration>> {
        Ok(self
            .lock()?
            .registrations
            .iter()
            .map(|(project, path)| Registration {
                project: project.clone(),
                path: path.clone(),
            })
            .collect())
    }

    /// Removes the ephemeral descriptor of `project`.
    ///
    /// Returns `Ok(false)` when nothing was registered or the file was
    /// already gone.
    ///
    /// # Errors
    ///
    /// Returns `Error::CleanupFailed` if the file exists but cannot be
    /// deleted. The registration is kept so a later clean can retry.
    pub fn clean(&self, project: &ProjectId) -> Result<bool> {
        let mut state = self.lock()?;
        let Some(path) = state.registrations.get(project).cloned() else {
            return Ok(false);
        };
        let removed = remove_ephemeral(&path)?;
        state.registrations.remove(project);
        Ok(removed)
    }

    /// Removes every registered ephemeral descriptor.
    pub fn clean_all(&self) -> Result<CleanReport> {
        let mut state = self.lock()?;
        let mut report = CleanReport::default();
        let registrations = std::mem::take(&mut state.registrations);
        for (project, path) in registrations {
            let outcome = remove_ephemeral(&path);
            if outcome.is_err() {
                state.registrations.insert(project, path.clone());
            }
            report.record(path, outcome);
        }
        info!("Removed {} ephemeral descriptor(s)", report.removed.len());
        Ok(report)
    }
}

impl Drop for BuildSession {
    fn drop(&mut self) {
        if self.keep_on_exit {
            return;
        }
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for path in state.registrations.values() {
            if let Err(e) = remove_ephemeral(path) {
                warn!("{}", e);
            }
        }
    }
}

/// Deletes an ephemeral descriptor.
///
/// Returns `Ok(false)` if the file does not exist.
///
/// # Errors
///
/// Returns `Error::CleanupFailed` for any other I/O failure.
pub fn remove_ephemeral(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::CleanupFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Removes the ephemeral descriptors of every project in `graph`.
///
/// Works without a session, so it also cleans up after a build that was
/// interrupted or ran in another process.
pub fn clean_graph(graph: &ProjectGraph) -> CleanReport {
    let mut report = CleanReport::default();
    for project in graph.projects() {
        let path = ephemeral_path(&project.path);
        let outcome = remove_ephemeral(&path);
        report.record(path, outcome);
    }
    info!("Removed {} ephemeral descriptor(s)", report.removed.len());
    report
}
