//! Library-level integration tests running against real git repositories.
//!
//! These tests drive the orchestrator the way a build host does and inspect
//! the ephemeral descriptors it leaves on disk.

mod common;

use common::prelude::*;
use git_versioning::defaults::NO_COMMIT;
use git_versioning::descriptor::marshal;
use git_versioning::descriptor::ProjectDescriptor;
use git_versioning::lifecycle::AttachOutcome;
use git_versioning::orchestrator::{self, Options};
use git_versioning::resolver::ResolutionMode;
use std::path::Path;

fn options(dir: &Path) -> Options {
    Options {
        project_dir: dir.to_path_buf(),
        ..Options::default()
    }
}

fn ephemeral_count(fixture: &TestFixture) -> usize {
    [".git-versioned.pom.yaml", "api/.git-versioned.pom.yaml", "app/.git-versioned.pom.json"]
        .iter()
        .filter(|path| fixture.file(path).exists())
        .count()
}

/// Clears the fields attach is allowed to change.
fn without_version(mut descriptor: ProjectDescriptor) -> ProjectDescriptor {
    descriptor.version = None;
    descriptor.properties.clear();
    descriptor
}

#[test]
fn test_multi_module_graph_is_rewritten() {
    let fixture = TestFixture::new()
        .with_config(configs::BRANCH_SNAPSHOT)
        .with_multi_module_project()
        .commit("initial")
        .tag("v1.2.3");

    let attachment = orchestrator::attach(&options(fixture.path()), true).unwrap();
    assert_eq!(attachment.resolution.version.value, "1.2.3");
    assert_eq!(attachment.outcome, Some(AttachOutcome::Attached(3)));

    let parent = marshal::parse(&fixture.file(".git-versioned.pom.yaml")).unwrap();
    assert_eq!(parent.version.as_deref(), Some("1.2.3"));
    assert!(parent.extra["build"]["plugins"]
        .as_sequence()
        .unwrap()
        .is_empty());

    let api = marshal::parse(&fixture.file("api/.git-versioned.pom.yaml")).unwrap();
    assert_eq!(api.version.as_deref(), Some("1.2.3"));
    assert_eq!(api.parent.unwrap().version.as_deref(), Some("1.2.3"));

    let app = marshal::parse(&fixture.file("app/.git-versioned.pom.json")).unwrap();
    assert_eq!(app.dependencies[0].version.as_deref(), Some("1.2.3"));
    assert_eq!(app.dependencies[1].version.as_deref(), Some("2.0.9"));
    assert_eq!(
        app.properties.get("git.tag").and_then(|v| v.as_str()),
        Some("v1.2.3")
    );
}

#[test]
fn test_ephemeral_descriptor_keeps_every_other_field() {
    let fixture = TestFixture::new()
        .with_config(configs::BRANCH_SNAPSHOT)
        .with_multi_module_project()
        .commit("initial")
        .branch("feature/round-trip");

    let _attachment = orchestrator::attach(&options(fixture.path()), true).unwrap();

    let original = marshal::parse(&fixture.file("api/pom.yaml")).unwrap();
    let mut rewritten = marshal::parse(&fixture.file("api/.git-versioned.pom.yaml")).unwrap();
    if let Some(parent) = rewritten.parent.as_mut() {
        parent.version = original.parent.as_ref().and_then(|p| p.version.clone());
    }
    assert_eq!(without_version(rewritten), without_version(original));

    let original = marshal::parse(&fixture.file("pom.yaml")).unwrap();
    let rewritten = marshal::parse(&fixture.file(".git-versioned.pom.yaml")).unwrap();
    assert_eq!(rewritten.extra["packaging"], original.extra["packaging"]);
    assert_eq!(rewritten.extra["modelVersion"], original.extra["modelVersion"]);
    assert_eq!(rewritten.modules, original.modules);
    assert_eq!(
        rewritten.properties.get("build.channel").and_then(|v| v.as_str()),
        Some("feature/round-trip")
    );
}

#[test]
fn test_attach_twice_then_clean_twice() {
    let fixture = TestFixture::new()
        .with_config(configs::GIT_VERSIONING)
        .with_multi_module_project()
        .commit("initial");

    let first = orchestrator::attach(&options(fixture.path()), true).unwrap();
    let second = orchestrator::attach(&options(fixture.path()), true).unwrap();
    assert_eq!(second.outcome, Some(AttachOutcome::Attached(3)));
    assert_eq!(ephemeral_count(&fixture), 3);
    drop((first, second));

    let report = orchestrator::clean(fixture.path()).unwrap();
    assert_eq!(report.removed.len(), 3);
    assert_eq!(ephemeral_count(&fixture), 0);

    let report = orchestrator::clean(fixture.path()).unwrap();
    assert!(report.removed.is_empty());
    assert!(report.is_success());
}

#[test]
fn test_detached_head_with_branch_override() {
    let fixture = TestFixture::new()
        .with_config(configs::GIT_VERSIONING)
        .with_file("pom.yaml", descriptors::SINGLE)
        .commit("initial")
        .detach();

    let mut opts = options(fixture.path());
    let detached = orchestrator::resolve_version(&opts).unwrap();
    assert_eq!(detached.version.value, NO_COMMIT);
    assert_eq!(detached.version.mode, ResolutionMode::NoCommit);

    opts.overrides.branch = Some("feature/test".to_string());
    let resolved = orchestrator::resolve_version(&opts).unwrap();
    assert_eq!(resolved.version.value, "feature-test-gitVersioning");
    assert_eq!(resolved.version.properties["git.commit"], fixture.head());
}

#[test]
fn test_dirty_tree_gets_suffix() {
    let fixture = TestFixture::new()
        .with_config(configs::GIT_VERSIONING)
        .with_file("pom.yaml", descriptors::SINGLE)
        .commit("initial")
        .with_file("pom.yaml", "groupId: com.example\nartifactId: app\nversion: 0.0.1\n");

    let resolved = orchestrator::resolve_version(&options(fixture.path())).unwrap();
    assert_eq!(resolved.version.value, "main-gitVersioning-dirty");
    assert_eq!(resolved.version.properties["git.dirty"], "true");
}

#[test]
fn test_unborn_repository_resolves_to_no_commit() {
    let fixture = TestFixture::new()
        .with_config(configs::BRANCH_SNAPSHOT)
        .with_file("pom.yaml", descriptors::SINGLE);

    let resolved = orchestrator::resolve_version(&options(fixture.path())).unwrap();
    assert_eq!(resolved.version.value, NO_COMMIT);
    assert!(resolved.version.properties.is_empty());
}
