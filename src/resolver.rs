//! # Version Resolution
//!
//! [`resolve`] maps a [`RepoSituation`] and a [`RuleSet`] to a
//! [`ResolvedVersion`]. It is a pure function; the first step that produces
//! a version wins:
//!
//! 1. **Disabled**: the configuration turns versioning off.
//! 2. **Tag mode**: tags at HEAD are tried against each tag rule in order.
//!    For every rule all tags are tried in the order git reported them, so
//!    rule order takes precedence over tag order.
//! 3. **Branch mode**: the checked-out branch is tried against each branch
//!    rule in order.
//! 4. **Commit mode**: the commit fallback rule, when configured and HEAD
//!    carries a commit.
//! 5. **No commit**: the `NO_COMMIT` sentinel, without any properties.
//!
//! A rule that does not match is not an error; resolution falls through to
//! the next step. Only template failures are fatal.
//!
//! When the working tree is dirty, the dirty suffix is appended to the
//! version (never to properties) and `git.dirty` is set.

use std::collections::BTreeMap;

use log::debug;
use regex::Captures;

use crate::config::{
    Pattern, PropertyFormat, RuleMode, RuleSet, GIT_BRANCH, GIT_COMMIT, GIT_DIRTY, GIT_REF, GIT_TAG,
};
use crate::defaults::NO_COMMIT;
use crate::error::Result;
use crate::situation::RepoSituation;
use crate::template::{Context, Template};

/// Length of `${commit.short}`.
pub const SHORT_COMMIT_LEN: usize = 8;

/// Which resolution step produced a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    Disabled,
    Tag,
    Branch,
    Commit,
    NoCommit,
}

/// A resolved version and the properties derived alongside it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedVersion {
    pub value: String,
    pub properties: BTreeMap<String, String>,
    pub mode: ResolutionMode,
}

impl ResolvedVersion {
    fn sentinel(mode: ResolutionMode) -> Self {
        Self {
            value: NO_COMMIT.to_string(),
            properties: BTreeMap::new(),
            mode,
        }
    }

    /// Returns `true` if the version is the `NO_COMMIT` sentinel.
    pub fn is_sentinel(&self) -> bool {
        matches!(self.mode, ResolutionMode::Disabled | ResolutionMode::NoCommit)
    }
}

/// Resolves the version for a situation.
///
/// # Errors
///
/// Returns `Error::UnresolvedPlaceholder` if the selected rule references a
/// placeholder without a value (for example `${describe}` in a repository
/// without tags).
///
/// # Examples
///
/// ```
/// use git_versioning::config;
/// use git_versioning::resolver::resolve;
/// use git_versioning::situation::RepoSituation;
///
/// let rules = config::parse(r#"
/// branch:
///   - pattern: ".*"
///     versionFormat: "${branch}-SNAPSHOT"
/// "#).unwrap();
/// let situation = RepoSituation::new(
///     true,
///     "0123456789abcdef0123456789abcdef01234567",
///     Some("feature/login".to_string()),
///     Vec::new(),
///     None,
/// ).unwrap();
///
/// let resolved = resolve(&situation, &rules).unwrap();
/// assert_eq!(resolved.value, "feature-login-SNAPSHOT");
/// ```
pub fn resolve(situation: &RepoSituation, config: &RuleSet) -> Result<ResolvedVersion> {
    if config.disable {
        debug!("Versioning is disabled");
        return Ok(ResolvedVersion::sentinel(ResolutionMode::Disabled));
    }

    let resolved = match resolve_clean(situation, config)? {
        Some(resolved) => resolved,
        None => {
            debug!("No rule applies, using the no-commit version");
            return Ok(ResolvedVersion::sentinel(ResolutionMode::NoCommit));
        }
    };

    Ok(apply_dirty_state(resolved, situation, config))
}

fn resolve_clean(situation: &RepoSituation, config: &RuleSet) -> Result<Option<ResolvedVersion>> {
    for rule in &config.tag {
        for tag in situation.head_tags() {
            if let Some(captures) = rule.pattern.captures(tag) {
                debug!("Tag '{}' matches pattern '{}'", tag, rule.pattern.source());
                let mut properties = BTreeMap::new();
                properties.insert(GIT_TAG.to_string(), tag.clone());
                properties.insert(GIT_REF.to_string(), format!("refs/tags/{}", tag));
                let mut context =
                    base_context(situation, &rule.pattern, &captures, &mut properties);
                context.insert("tag", tag.as_str());
                return render_rule(
                    ResolutionMode::Tag,
                    context,
                    properties,
                    &rule.properties,
                    &rule.version_format,
                )
                .map(Some);
            }
        }
    }

    if let Some(branch) = situation.head_branch() {
        for rule in &config.branch {
            if let Some(captures) = rule.pattern.captures(branch) {
                debug!(
                    "Branch '{}' matches pattern '{}'",
                    branch,
                    rule.pattern.source()
                );
                let mut properties = BTreeMap::new();
                properties.insert(GIT_BRANCH.to_string(), branch.to_string());
                properties.insert(GIT_REF.to_string(), format!("refs/heads/{}", branch));
                let mut context =
                    base_context(situation, &rule.pattern, &captures, &mut properties);
                context.insert("branch", branch.replace('/', "-"));
                return render_rule(
                    ResolutionMode::Branch,
                    context,
                    properties,
                    &rule.properties,
                    &rule.version_format,
                )
                .map(Some);
            }
        }
    }

    match &config.commit {
        Some(rule) if situation.has_commit() => {
            let mut properties = BTreeMap::new();
            let context = commit_context(situation, &mut properties);
            render_rule(
                ResolutionMode::Commit,
                context,
                properties,
                &rule.properties,
                &rule.version_format,
            )
            .map(Some)
        }
        _ => Ok(None),
    }
}

/// Context shared by every mode: commit information plus the injected
/// properties gathered so far.
fn commit_context(situation: &RepoSituation, properties: &mut BTreeMap<String, String>) -> Context {
    let commit = situation.head_commit();
    properties.insert(GIT_COMMIT.to_string(), commit.to_string());

    let mut context = Context::new();
    context.insert("commit", commit);
    context.insert("commit.short", &commit[..SHORT_COMMIT_LEN]);
    if let Some(describe) = situation.head_describe() {
        context.insert("describe", describe);
    }
    for (name, value) in properties.iter() {
        context.insert(name.as_str(), value.as_str());
    }
    context
}

/// Commit context plus the named groups of the matching pattern. Fixed
/// names win over group names.
fn base_context(
    situation: &RepoSituation,
    pattern: &Pattern,
    captures: &Captures<'_>,
    properties: &mut BTreeMap<String, String>,
) -> Context {
    let mut context = commit_context(situation, properties);
    for name in pattern.group_names() {
        if let Some(value) = captures.name(name) {
            context.insert_if_absent(name, value.as_str());
        }
    }
    context
}

fn render_rule(
    mode: ResolutionMode,
    mut context: Context,
    mut properties: BTreeMap<String, String>,
    property_formats: &[PropertyFormat],
    version_format: &Template,
) -> Result<ResolvedVersion> {
    for property in property_formats {
        let value = property.value.render(&context)?;
        context.insert(property.name.as_str(), value.as_str());
        properties.insert(property.name.clone(), value);
    }

    let value = version_format.render(&context)?;
    debug!("Resolved {} version '{}'", mode_name(mode), value);
    Ok(ResolvedVersion {
        value,
        properties,
        mode,
    })
}

fn mode_name(mode: ResolutionMode) -> RuleMode {
    match mode {
        ResolutionMode::Tag => RuleMode::Tag,
        ResolutionMode::Branch => RuleMode::Branch,
        _ => RuleMode::Commit,
    }
}

fn apply_dirty_state(
    mut resolved: ResolvedVersion,
    situation: &RepoSituation,
    config: &RuleSet,
) -> ResolvedVersion {
    if !situation.is_clean() {
        if let Some(suffix) = config.effective_dirty_suffix() {
            resolved.value.push_str(suffix);
        }
        resolved
            .properties
            .insert(GIT_DIRTY.to_string(), "true".to_string());
    }
    resolved
}
