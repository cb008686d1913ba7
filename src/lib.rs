//! # git-versioning
//!
//! This library derives a project's build version from the state of its git
//! working copy and hands that version to the build through ephemeral,
//! rewritten project descriptors. It backs the `git-versioning` command-line
//! tool but can be embedded in any build host.
//!
//! ## Quick Example
//!
//! ```
//! use git_versioning::config;
//! use git_versioning::resolver::resolve;
//! use git_versioning::situation::RepoSituation;
//!
//! let rules = config::parse(r#"
//! tag:
//!   - pattern: "v(?<version>.+)"
//!     versionFormat: "${version}"
//! "#).unwrap();
//!
//! let situation = RepoSituation::new(
//!     true,
//!     "0123456789abcdef0123456789abcdef01234567",
//!     None,
//!     vec!["v1.4.0".to_string()],
//!     None,
//! ).unwrap();
//!
//! let resolved = resolve(&situation, &rules).unwrap();
//! assert_eq!(resolved.value, "1.4.0");
//! assert_eq!(resolved.properties["git.ref"], "refs/tags/v1.4.0");
//! ```
//!
//! ## Core Concepts
//!
//! - **Repository situation (`situation`, `repository`, `git`)**: an
//!   immutable snapshot of the HEAD commit, branch, tags and cleanliness,
//!   read through the `GitOperations` trait.
//! - **Configuration (`config`, `template`)**: the `.git-versioning.yaml`
//!   rules mapping tags and branches to version templates.
//! - **Resolution (`resolver`)**: a pure function from situation and rules
//!   to a `ResolvedVersion`.
//! - **Descriptors (`descriptor`, `rewrite`)**: the project graph and its
//!   rewriting with the resolved version.
//! - **Lifecycle (`lifecycle`)**: writing, registering and removing the
//!   ephemeral descriptors of one build.
//!
//! ## Execution Flow
//!
//! The `orchestrator` runs the steps in order: load the configuration, read
//! the situation, apply CI overrides, resolve once, load the graph and
//! attach. `clean` removes the ephemeral descriptors again.

pub mod config;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod orchestrator;
pub mod output;
pub mod repository;
pub mod resolver;
pub mod rewrite;
pub mod situation;
pub mod template;

mod template_proptest;
