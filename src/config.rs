//! # Configuration Schema and Parsing
//!
//! This module defines the data structures that represent the
//! `.git-versioning.yaml` configuration file and the logic for parsing and
//! validating it.
//!
//! ## Format
//!
//! ```yaml
//! disable: false
//! updatePom: true
//! dirtySuffix: -dirty
//! commit:
//!   versionFormat: "${commit.short}"
//! tag:
//!   - pattern: "v(?<version>.+)"
//!     versionFormat: "${version}"
//! branch:
//!   - pattern: ".*"
//!     versionFormat: "${branch}-SNAPSHOT"
//!     properties:
//!       - name: build.channel
//!         value: "${branch}"
//! ```
//!
//! ## Key Components
//!
//! - **`Configuration`**: the whole file; also exported as `RuleSet`.
//! - **`Rule`**: a tag or branch rule: a pattern, a version format and
//!   ordered property formats.
//! - **`CommitRule`**: the fallback format used when no tag or branch rule
//!   applies.
//!
//! Patterns must match the whole tag or branch name. Templates are compiled
//! during deserialization and validated against the vocabulary of their mode
//! right after, so a typo in a placeholder fails when the configuration is
//! loaded rather than halfway through a build.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use log::debug;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::defaults::{CONFIG_FILE_NAME, DEFAULT_DIRTY_SUFFIX};
use crate::error::{Error, Result};
use crate::template::Template;

/// Property name of the HEAD commit hash.
pub const GIT_COMMIT: &str = "git.commit";
/// Property name of the full ref (`refs/heads/...` or `refs/tags/...`).
pub const GIT_REF: &str = "git.ref";
/// Property name of the raw branch name.
pub const GIT_BRANCH: &str = "git.branch";
/// Property name of the matched tag.
pub const GIT_TAG: &str = "git.tag";
/// Property name set to `"true"` for a dirty working tree.
pub const GIT_DIRTY: &str = "git.dirty";

/// The resolution mode a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    Tag,
    Branch,
    Commit,
}

impl RuleMode {
    /// Placeholder names every rule of this mode can use.
    ///
    /// `describe` is always accepted but only has a value when a tag is
    /// reachable from HEAD.
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            RuleMode::Tag => &[
                "tag",
                "commit",
                "commit.short",
                "describe",
                GIT_COMMIT,
                GIT_REF,
                GIT_TAG,
            ],
            RuleMode::Branch => &[
                "branch",
                "commit",
                "commit.short",
                "describe",
                GIT_COMMIT,
                GIT_REF,
                GIT_BRANCH,
            ],
            RuleMode::Commit => &["commit", "commit.short", "describe", GIT_COMMIT],
        }
    }
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMode::Tag => f.write_str("tag"),
            RuleMode::Branch => f.write_str("branch"),
            RuleMode::Commit => f.write_str("commit"),
        }
    }
}

/// A regular expression that must match a whole tag or branch name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern, anchoring it at both ends.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matches a whole name, returning the capture groups on success.
    pub fn captures<'h>(&self, name: &'h str) -> Option<Captures<'h>> {
        self.regex.captures(name)
    }

    /// Names of the named capture groups.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(source: String) -> Result<Self> {
        Self::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// A named property template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyFormat {
    /// Property name, e.g. `build.channel`.
    pub name: String,
    /// Template rendering the property value.
    pub value: Template,
}

/// A tag or branch rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Rule {
    /// Pattern the tag or branch name must match.
    pub pattern: Pattern,
    /// Template rendering the version.
    pub version_format: Template,
    /// Property templates, rendered in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyFormat>,
}

/// The commit fallback rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommitRule {
    /// Template rendering the version from commit information.
    pub version_format: Template,
    /// Property templates, rendered in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyFormat>,
}

fn default_update_pom() -> bool {
    true
}

fn default_dirty_suffix() -> Option<String> {
    Some(DEFAULT_DIRTY_SUFFIX.to_string())
}

/// The complete versioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Configuration {
    /// Turns versioning off; descriptors are left untouched.
    #[serde(default)]
    pub disable: bool,
    /// Whether resolved properties are written into ephemeral descriptors.
    #[serde(default = "default_update_pom")]
    pub update_pom: bool,
    /// Suffix appended to versions of a dirty working tree; `null` or empty
    /// disables it.
    #[serde(default = "default_dirty_suffix")]
    pub dirty_suffix: Option<String>,
    /// Commit fallback rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRule>,
    /// Tag rules, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Rule>,
    /// Branch rules, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch: Vec<Rule>,
}

/// The rule set consumed by the resolver.
pub type RuleSet = Configuration;

impl Default for Configuration {
    fn default() -> Self {
        Self {
            disable: false,
            update_pom: default_update_pom(),
            dirty_suffix: default_dirty_suffix(),
            commit: None,
            tag: Vec::new(),
            branch: Vec::new(),
        }
    }
}

impl Configuration {
    /// The commit fallback format, if configured.
    pub fn commit_fallback_format(&self) -> Option<&Template> {
        self.commit.as_ref().map(|rule| &rule.version_format)
    }

    /// The dirty suffix, or `None` when it is disabled.
    pub fn effective_dirty_suffix(&self) -> Option<&str> {
        self.dirty_suffix.as_deref().filter(|suffix| !suffix.is_empty())
    }

    /// Validates every template against the vocabulary of its mode.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnresolvedPlaceholder` for the first placeholder that
    /// can never have a value.
    pub fn validate(&self) -> Result<()> {
        for rule in &self.tag {
            validate_rule(
                RuleMode::Tag,
                rule.pattern.group_names(),
                &rule.properties,
                &rule.version_format,
            )?;
        }
        for rule in &self.branch {
            validate_rule(
                RuleMode::Branch,
                rule.pattern.group_names(),
                &rule.properties,
                &rule.version_format,
            )?;
        }
        if let Some(rule) = &self.commit {
            validate_rule(
                RuleMode::Commit,
                std::iter::empty(),
                &rule.properties,
                &rule.version_format,
            )?;
        }
        Ok(())
    }
}

fn validate_rule<'a>(
    mode: RuleMode,
    group_names: impl Iterator<Item = &'a str>,
    properties: &'a [PropertyFormat],
    version_format: &Template,
) -> Result<()> {
    let mut known: HashSet<&str> = mode.vocabulary().iter().copied().collect();
    known.extend(group_names);

    for property in properties {
        property.value.validate(|name| known.contains(name))?;
        known.insert(property.name.as_str());
    }
    version_format.validate(|name| known.contains(name))
}

/// Parses and validates a YAML configuration.
///
/// An empty document yields the default configuration.
pub fn parse(yaml_content: &str) -> Result<Configuration> {
    if yaml_content
        .lines()
        .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'))
    {
        return Ok(Configuration::default());
    }

    let config: Configuration = serde_yaml::from_str(yaml_content).map_err(|e| {
        let message = e.to_string();
        let hint = message.contains("unknown field").then(|| {
            "Top-level keys are disable, updatePom, dirtySuffix, commit, tag and branch. \
             Rules take pattern, versionFormat and properties; each property takes name and value"
                .to_string()
        });
        Error::ConfigParse { message, hint }
    })?;
    config.validate()?;
    Ok(config)
}

/// Parses a configuration from a YAML file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Loads the configuration for a project.
///
/// An explicit path must exist. Without one, `.git-versioning.yaml` in
/// `project_dir` is used if present and the defaults otherwise.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Configuration> {
    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path.display());
        return from_file(path);
    }

    let path = project_dir.join(CONFIG_FILE_NAME);
    if path.is_file() {
        debug!("Loading configuration from {}", path.display());
        from_file(path)
    } else {
        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Configuration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
disable: false
updatePom: false
dirtySuffix: -SNAPSHOT
commit:
  versionFormat: "${commit.short}"
tag:
  - pattern: "v(?<version>.+)"
    versionFormat: "${version}"
branch:
  - pattern: "main"
    versionFormat: "main-${commit.short}"
  - pattern: ".*"
    versionFormat: "${branch}-SNAPSHOT"
    properties:
      - name: build.channel
        value: "${branch}"
"#;
        let config = parse(yaml).unwrap();
        assert!(!config.disable);
        assert!(!config.update_pom);
        assert_eq!(config.effective_dirty_suffix(), Some("-SNAPSHOT"));
        assert_eq!(
            config.commit_fallback_format().unwrap().source(),
            "${commit.short}"
        );
        assert_eq!(config.tag.len(), 1);
        assert_eq!(config.branch.len(), 2);
        assert_eq!(config.branch[1].properties[0].name, "build.channel");
    }

    #[test]
    fn test_parse_empty_config_is_default() {
        let config = parse("# nothing configured\n\n").unwrap();
        assert!(!config.disable);
        assert!(config.update_pom);
        assert_eq!(config.effective_dirty_suffix(), Some(DEFAULT_DIRTY_SUFFIX));
        assert!(config.commit.is_none());
        assert!(config.tag.is_empty());
        assert!(config.branch.is_empty());
    }

    #[test]
    fn test_null_dirty_suffix_disables_it() {
        let config = parse("dirtySuffix: null\n").unwrap();
        assert_eq!(config.effective_dirty_suffix(), None);

        let config = parse("dirtySuffix: ''\n").unwrap();
        assert_eq!(config.effective_dirty_suffix(), None);
    }

    #[test]
    fn test_pattern_matches_whole_name() {
        let pattern = Pattern::new("main").unwrap();
        assert!(pattern.captures("main").is_some());
        assert!(pattern.captures("main-2").is_none());
        assert!(pattern.captures("not-main").is_none());
    }

    #[test]
    fn test_pattern_alternation_is_anchored() {
        let pattern = Pattern::new("main|develop").unwrap();
        assert!(pattern.captures("develop").is_some());
        assert!(pattern.captures("develop-x").is_none());
    }

    #[test]
    fn test_unknown_placeholder_rejected_at_load() {
        let yaml = r#"
branch:
  - pattern: ".*"
    versionFormat: "${tag}-SNAPSHOT"
"#;
        let err = parse(yaml).unwrap_err();
        assert!(
            matches!(err, Error::UnresolvedPlaceholder { ref placeholder, .. } if placeholder == "tag"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_named_groups_and_earlier_properties_are_known() {
        let yaml = r#"
tag:
  - pattern: "v(?<major>\\d+)\\.(?<minor>\\d+)"
    versionFormat: "${major}.${minor}-${line}"
    properties:
      - name: line
        value: "${major}.x"
"#;
        assert!(parse(yaml).is_ok());
    }

    #[test]
    fn test_later_property_is_not_visible_to_earlier_one() {
        let yaml = r#"
branch:
  - pattern: ".*"
    versionFormat: "${branch}"
    properties:
      - name: first
        value: "${second}"
      - name: second
        value: "${branch}"
"#;
        assert!(matches!(
            parse(yaml),
            Err(Error::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_invalid_regex_fails() {
        let yaml = r#"
branch:
  - pattern: "[unclosed"
    versionFormat: "${branch}"
"#;
        assert!(matches!(parse(yaml), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_field_has_hint() {
        let err = parse("tags: []\n").unwrap_err();
        match err {
            Error::ConfigParse { hint, .. } => assert!(hint.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_rule_field_is_rejected() {
        let yaml = r#"
branch:
  - pattern: ".*"
    versionFormat: "${branch}"
    property:
      - name: x
        value: "${nope}"
"#;
        match parse(yaml).unwrap_err() {
            Error::ConfigParse { message, hint } => {
                assert!(message.contains("property"));
                assert!(hint.unwrap().contains("versionFormat"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_property_and_commit_fields_are_rejected() {
        let property = r#"
tag:
  - pattern: ".*"
    versionFormat: "${tag}"
    properties:
      - name: x
        template: "${tag}"
"#;
        assert!(matches!(parse(property), Err(Error::ConfigParse { .. })));

        let commit = "commit:\n  format: \"${commit}\"\n";
        assert!(matches!(parse(commit), Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load(temp_dir.path(), None).unwrap();
        assert!(config.tag.is_empty());
    }

    #[test]
    fn test_load_from_project_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "disable: true\n").unwrap();
        let config = load(temp_dir.path(), None).unwrap();
        assert!(config.disable);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        assert!(matches!(
            load(temp_dir.path(), Some(&missing)),
            Err(Error::Io(_))
        ));
    }
}
