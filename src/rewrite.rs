//! # Descriptor Graph Rewriting
//!
//! Applies resolved versions to every descriptor of a build graph and keeps
//! the references between graph projects consistent:
//!
//! - each project's own version is replaced, including projects that
//!   previously inherited their version from a parent;
//! - a parent reference to a graph project receives that project's version;
//! - dependencies and dependency-management entries naming a graph project
//!   receive its version, unless their version is absent or a property
//!   expression such as `${project.version}`.
//!
//! References to projects outside the graph are never touched. The input
//! descriptors are not modified; the rewriter returns new values in input
//! order.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;
use serde_yaml::Value;

use crate::descriptor::{is_property_expression, Dependency, ProjectDescriptor, ProjectId};
use crate::error::{Error, Result};
use crate::resolver::ResolvedVersion;

/// Controls what the rewriter adds besides versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Add the resolved properties to each descriptor's property bag.
    pub inject_properties: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            inject_properties: true,
        }
    }
}

/// Rewrites a graph with the default options.
pub fn rewrite(
    graph: &[ProjectDescriptor],
    resolved: &HashMap<ProjectId, ResolvedVersion>,
) -> Result<Vec<ProjectDescriptor>> {
    rewrite_with(graph, resolved, &RewriteOptions::default())
}

/// Rewrites every descriptor of `graph` with its resolved version.
///
/// # Errors
///
/// - `Error::Rewrite` if a descriptor has no identity or no resolved
///   version.
/// - `Error::VersionDivergence` if the projects resolved to different
///   versions.
pub fn rewrite_with(
    graph: &[ProjectDescriptor],
    resolved: &HashMap<ProjectId, ResolvedVersion>,
    options: &RewriteOptions,
) -> Result<Vec<ProjectDescriptor>> {
    let mut versions = Vec::with_capacity(graph.len());
    for descriptor in graph {
        let id = descriptor.id().ok_or_else(|| Error::Rewrite {
            project: descriptor.artifact_id.clone(),
            message: "project has no groupId".to_string(),
        })?;
        let version = resolved.get(&id).ok_or_else(|| Error::Rewrite {
            project: id.to_string(),
            message: "no resolved version for project".to_string(),
        })?;
        versions.push((id, version));
    }
    check_consistency(&versions)?;

    let members = Members {
        ids: versions.iter().map(|(id, _)| id.clone()).collect(),
        resolved,
    };
    Ok(graph
        .iter()
        .zip(&versions)
        .map(|(descriptor, (id, version))| {
            debug!("Rewriting {} to version {}", id, version.value);
            rewrite_one(descriptor, version, &members, options)
        })
        .collect())
}

/// Resolved versions restricted to the projects of the graph being
/// rewritten. Entries for other projects are ignored.
struct Members<'a> {
    ids: HashSet<ProjectId>,
    resolved: &'a HashMap<ProjectId, ResolvedVersion>,
}

impl Members<'_> {
    fn version_of(&self, id: &ProjectId) -> Option<&str> {
        if !self.ids.contains(id) {
            return None;
        }
        self.resolved.get(id).map(|version| version.value.as_str())
    }
}

fn check_consistency(versions: &[(ProjectId, &ResolvedVersion)]) -> Result<()> {
    let distinct: BTreeSet<&str> = versions
        .iter()
        .map(|(_, version)| version.value.as_str())
        .collect();
    if distinct.len() <= 1 {
        return Ok(());
    }

    let details = versions
        .iter()
        .map(|(id, version)| format!("{}={}", id, version.value))
        .collect::<Vec<_>>()
        .join(", ");
    Err(Error::VersionDivergence { details })
}

fn rewrite_one(
    descriptor: &ProjectDescriptor,
    version: &ResolvedVersion,
    members: &Members<'_>,
    options: &RewriteOptions,
) -> ProjectDescriptor {
    let mut rewritten = descriptor.clone();
    rewritten.version = Some(version.value.clone());

    if let Some(parent) = rewritten.parent.as_mut() {
        if let Some(parent_version) = members.version_of(&parent.id()) {
            parent.version = Some(parent_version.to_string());
        }
    }

    for dependency in &mut rewritten.dependencies {
        rewrite_dependency(descriptor, dependency, members);
    }
    if let Some(management) = rewritten.dependency_management.as_mut() {
        for dependency in &mut management.dependencies {
            rewrite_dependency(descriptor, dependency, members);
        }
    }

    if options.inject_properties {
        for (name, value) in &version.properties {
            rewritten
                .properties
                .insert(name.clone(), Value::String(value.clone()));
        }
    }
    rewritten
}

fn rewrite_dependency(
    owner: &ProjectDescriptor,
    dependency: &mut Dependency,
    members: &Members<'_>,
) {
    let pinned = dependency
        .version
        .as_deref()
        .is_some_and(|version| !is_property_expression(version));
    if !pinned {
        return;
    }

    let id = ProjectId::new(
        owner.interpolate_group_id(&dependency.group_id),
        dependency.artifact_id.as_str(),
    );
    if let Some(target) = members.version_of(&id) {
        dependency.version = Some(target.to_string());
    }
}
