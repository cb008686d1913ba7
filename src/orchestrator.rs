//! Orchestration of one versioned build.
//!
//! This module ties the components together in the order a build host
//! invokes them:
//!
//! 1. Load the configuration (`.git-versioning.yaml` or an explicit path).
//! 2. Read the repository situation and apply CI overrides.
//! 3. Resolve the version once for the whole build.
//! 4. Load the project graph and attach ephemeral descriptors.
//!
//! When versioning is disabled the repository is not read at all and the
//! attach step is skipped, leaving the descriptors untouched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{self, Configuration};
use crate::defaults::{find_descriptor, DESCRIPTOR_FILE_NAMES};
use crate::descriptor::graph::ProjectGraph;
use crate::descriptor::ProjectId;
use crate::error::{Error, Result};
use crate::lifecycle::{clean_graph, AttachOutcome, BuildSession, CleanReport};
use crate::repository::{self, SituationOverrides};
use crate::resolver::{self, ResolvedVersion};
use crate::rewrite::RewriteOptions;
use crate::situation::RepoSituation;

/// Inputs of a build invocation.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub project_dir: PathBuf,
    /// Explicit configuration file instead of `.git-versioning.yaml`.
    pub config: Option<PathBuf>,
    pub overrides: SituationOverrides,
    /// Disables versioning for this invocation regardless of the
    /// configuration.
    pub disable: bool,
}

/// A resolved version together with what it was resolved from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: Configuration,
    pub situation: RepoSituation,
    pub version: ResolvedVersion,
}

/// Loads the configuration and resolves the version of the build.
pub fn resolve_version(options: &Options) -> Result<Resolution> {
    let mut config = config::load(&options.project_dir, options.config.as_deref())?;
    if options.disable {
        config.disable = true;
    }

    let situation = if config.disable {
        RepoSituation::default()
    } else {
        let mut situation = repository::read(&options.project_dir)?;
        if !options.overrides.is_empty() {
            options.overrides.apply(&mut situation)?;
        }
        situation
    };

    let version = resolver::resolve(&situation, &config)?;
    if version.is_sentinel() {
        info!("No version resolved, using {}", version.value);
    } else {
        info!("Resolved version {}", version.value);
    }
    Ok(Resolution {
        config,
        situation,
        version,
    })
}

/// Loads the project graph rooted in `project_dir`.
///
/// # Errors
///
/// Returns `Error::Descriptor` if the directory holds no descriptor.
pub fn load_graph(project_dir: &Path) -> Result<ProjectGraph> {
    let root = find_descriptor(project_dir).ok_or_else(|| Error::Descriptor {
        path: project_dir.to_path_buf(),
        message: format!(
            "No descriptor found, expected one of {}",
            DESCRIPTOR_FILE_NAMES.join(", ")
        ),
    })?;
    ProjectGraph::load(&root)
}

/// Assigns the build's version to every project of the graph.
pub fn versions(
    graph: &ProjectGraph,
    version: &ResolvedVersion,
) -> HashMap<ProjectId, ResolvedVersion> {
    graph
        .projects()
        .iter()
        .map(|project| (project.id.clone(), version.clone()))
        .collect()
}

/// An attached build: the resolution, the graph and the session owning the
/// ephemeral descriptors.
#[derive(Debug)]
pub struct Attachment {
    pub resolution: Resolution,
    pub graph: ProjectGraph,
    pub session: BuildSession,
    /// `None` when versioning is disabled and nothing was attached.
    pub outcome: Option<AttachOutcome>,
}

impl Attachment {
    /// The descriptor the build should use for the root project.
    pub fn root_descriptor(&self) -> Result<PathBuf> {
        let root = self.graph.root();
        Ok(self
            .session
            .effective_descriptor(&root.id)?
            .unwrap_or_else(|| root.path.clone()))
    }
}

/// Resolves the version and attaches ephemeral descriptors for the graph
/// in `options.project_dir`.
///
/// With `keep_on_exit` the files outlive the returned session, for hosts
/// that run the build in a separate step.
pub fn attach(options: &Options, keep_on_exit: bool) -> Result<Attachment> {
    let resolution = resolve_version(options)?;
    let graph = load_graph(&options.project_dir)?;
    let root = graph.root().id.clone();
    let session = BuildSession::new(root.clone()).keep_on_exit(keep_on_exit);

    let outcome = if resolution.config.disable {
        debug!("Versioning is disabled, leaving descriptors untouched");
        None
    } else {
        let rewrite_options = RewriteOptions {
            inject_properties: resolution.config.update_pom,
        };
        let resolved = versions(&graph, &resolution.version);
        Some(session.attach(&root, &graph, &resolved, &rewrite_options)?)
    };

    Ok(Attachment {
        resolution,
        graph,
        session,
        outcome,
    })
}

/// Removes the ephemeral descriptors of the graph in `project_dir`.
pub fn clean(project_dir: &Path) -> Result<CleanReport> {
    let graph = load_graph(project_dir)?;
    Ok(clean_graph(&graph))
}
