//! # Project Descriptors
//!
//! A project descriptor is the structured build manifest of one project,
//! written in the YAML or JSON flavour of the Maven project model:
//!
//! ```yaml
//! modelVersion: 4.0.0
//! groupId: com.example
//! artifactId: parent
//! version: 0.0.0-SNAPSHOT
//! packaging: pom
//! modules:
//!   - api
//!   - app
//! dependencies:
//!   - groupId: com.example
//!     artifactId: api
//!     version: 0.0.0-SNAPSHOT
//! ```
//!
//! Only the fields version rewriting touches are typed: identity, version,
//! parent reference, modules, properties, dependencies and dependency
//! management. Every other field (packaging, build, profiles, ...) is kept
//! in a flattened pass-through mapping so that a rewritten descriptor
//! carries all of it unchanged.
//!
//! ## Submodules
//!
//! - **`marshal`**: reading and writing descriptor files.
//! - **`graph`**: loading a root descriptor together with its modules.

pub mod graph;
pub mod marshal;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Identity of a project inside a build graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId {
    pub group_id: String,
    pub artifact_id: String,
}

impl ProjectId {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Reference to a parent project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ParentRef {
    pub fn id(&self) -> ProjectId {
        ProjectId::new(&self.group_id, &self.artifact_id)
    }
}

/// A dependency or dependency-management entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Scope, type, classifier, exclusions and any other field.
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyManagement {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// The build manifest of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_management: Option<DependencyManagement>,
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Returns `true` if a version is a property expression such as
/// `${project.version}` that the build host resolves itself.
pub fn is_property_expression(version: &str) -> bool {
    version.contains("${")
}

impl ProjectDescriptor {
    /// Creates a descriptor with only its identity and version set.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            artifact_id: artifact_id.into(),
            version,
            parent: None,
            modules: Vec::new(),
            properties: BTreeMap::new(),
            dependencies: Vec::new(),
            dependency_management: None,
            extra: Mapping::new(),
        }
    }

    /// The group id, inherited from the parent when not declared.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|parent| parent.group_id.as_str()))
    }

    /// The project identity, or `None` when no group id is declared or
    /// inherited.
    pub fn id(&self) -> Option<ProjectId> {
        self.effective_group_id()
            .map(|group_id| ProjectId::new(group_id, &self.artifact_id))
    }

    /// Expands the group id expressions a dependency may use to refer to
    /// its own project.
    ///
    /// `${project.groupId}` and `${pom.groupId}` expand to this project's
    /// group id, `${project.parent.groupId}` to the parent's. Unknown
    /// expressions are left as written.
    pub fn interpolate_group_id(&self, raw: &str) -> String {
        if !is_property_expression(raw) {
            return raw.to_string();
        }

        let mut expanded = raw.to_string();
        if let Some(group_id) = self.effective_group_id() {
            expanded = expanded
                .replace("${project.groupId}", group_id)
                .replace("${pom.groupId}", group_id);
        }
        if let Some(parent) = &self.parent {
            expanded = expanded.replace("${project.parent.groupId}", &parent.group_id);
        }
        expanded
    }

    /// Removes a plugin from `build.plugins`.
    ///
    /// Returns `true` if at least one entry was removed.
    pub fn remove_plugin(&mut self, group_id: &str, artifact_id: &str) -> bool {
        let Some(Value::Mapping(build)) = self.extra.get_mut("build") else {
            return false;
        };
        let Some(Value::Sequence(plugins)) = build.get_mut("plugins") else {
            return false;
        };

        let before = plugins.len();
        plugins.retain(|plugin| {
            let field = |name: &str| plugin.get(name).and_then(Value::as_str);
            !(field("groupId") == Some(group_id) && field("artifactId") == Some(artifact_id))
        });
        before != plugins.len()
    }
}
