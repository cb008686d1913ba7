//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture that builds a small git repository holding
//! a `.git-versioning.yaml` configuration and project descriptors.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_config(configs::BRANCH_SNAPSHOT)
//!         .with_file("pom.yaml", descriptors::SINGLE)
//!         .commit("initial");
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{configs, descriptors};
    pub use super::TestFixture;
}

/// Configuration snippets.
#[allow(dead_code)]
pub mod configs {
    /// Tag and branch rules as commonly used by release pipelines.
    pub const BRANCH_SNAPSHOT: &str = r#"
commit:
  versionFormat: "${commit.short}"
tag:
  - pattern: "v(?<version>.+)"
    versionFormat: "${version}"
branch:
  - pattern: ".*"
    versionFormat: "${branch}-SNAPSHOT"
    properties:
      - name: build.channel
        value: "${git.branch}"
"#;

    /// Rules producing `<tag>-gitVersioning` and `<branch>-gitVersioning`.
    pub const GIT_VERSIONING: &str = r#"
tag:
  - pattern: ".*"
    versionFormat: "${tag}-gitVersioning"
branch:
  - pattern: ".*"
    versionFormat: "${branch}-gitVersioning"
"#;

    /// A configuration that references an unknown placeholder.
    pub const UNKNOWN_PLACEHOLDER: &str = r#"
branch:
  - pattern: ".*"
    versionFormat: "${brnch}"
"#;
}

/// Descriptor snippets.
#[allow(dead_code)]
pub mod descriptors {
    pub const SINGLE: &str = r#"modelVersion: 4.0.0
groupId: com.example
artifactId: app
version: 0.0.0
"#;

    pub const PARENT: &str = r#"modelVersion: 4.0.0
groupId: com.example
artifactId: parent
version: 0.0.0
packaging: pom
modules:
  - api
  - app
build:
  plugins:
    - groupId: io.github.git-versioning
      artifactId: git-versioning
      version: 0.4.0
"#;

    pub const API: &str = r#"modelVersion: 4.0.0
artifactId: api
parent:
  groupId: com.example
  artifactId: parent
  version: 0.0.0
"#;

    pub const APP: &str = r#"{
  "modelVersion": "4.0.0",
  "artifactId": "app",
  "parent": {"groupId": "com.example", "artifactId": "parent", "version": "0.0.0"},
  "dependencies": [
    {"groupId": "${project.groupId}", "artifactId": "api", "version": "0.0.0"},
    {"groupId": "org.slf4j", "artifactId": "slf4j-api", "version": "2.0.9"}
  ]
}
"#;
}

/// A temporary git repository for tests.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create an initialised repository on branch `main`, without commits.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture.git(&["init", "--quiet"]);
        fixture.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        fixture.git(&["config", "user.name", "test-user"]);
        fixture.git(&["config", "user.email", "test@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture.git(&["config", "tag.gpgsign", "false"]);
        fixture
    }

    /// Add a `.git-versioning.yaml` configuration file.
    pub fn with_config(self, content: &str) -> Self {
        self.with_file(".git-versioning.yaml", content)
    }

    /// Add the three-project graph from `descriptors`.
    #[allow(dead_code)]
    pub fn with_multi_module_project(self) -> Self {
        self.with_file("pom.yaml", descriptors::PARENT)
            .with_file("api/pom.yaml", descriptors::API)
            .with_file("app/pom.json", descriptors::APP)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Stage everything and commit.
    pub fn commit(self, message: &str) -> Self {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
        self
    }

    /// Create a tag at HEAD.
    #[allow(dead_code)]
    pub fn tag(self, name: &str) -> Self {
        self.git(&["tag", name]);
        self
    }

    /// Create and check out a branch.
    #[allow(dead_code)]
    pub fn branch(self, name: &str) -> Self {
        self.git(&["checkout", "--quiet", "-b", name]);
        self
    }

    /// Detach HEAD at the current commit.
    #[allow(dead_code)]
    pub fn detach(self) -> Self {
        self.git(&["checkout", "--quiet", "--detach"]);
        self
    }

    /// Run git in the fixture and return its trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// The HEAD commit hash.
    #[allow(dead_code)]
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the fixture.
    #[allow(dead_code)]
    pub fn file(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create a command for the `git-versioning` binary running in this
    /// fixture, isolated from CI variables of the surrounding environment.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("git-versioning");
        cmd.current_dir(self.path())
            .env_remove("GIT_VERSIONING_BRANCH")
            .env_remove("GIT_VERSIONING_TAG")
            .env_remove("GIT_VERSIONING_DISABLE")
            .env_remove("GIT_VERSIONING_CONFIG")
            .env_remove("GIT_VERSIONING_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
