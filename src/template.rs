//! # Version Templates
//!
//! Version and property formats are small templates built from literal text
//! and `${name}` placeholders:
//!
//! - `${name}` is replaced by the value of `name` in the render context.
//!   Names consist of ASCII letters, digits, `_`, `.` and `-`.
//! - `$${` renders a literal `${`, so `$${branch}` produces `${branch}`.
//! - A `$` that does not start a placeholder is literal text.
//!
//! Templates are compiled once, when the configuration is loaded, and
//! rendered once per resolution. Rendering is a single left-to-right pass:
//! substituted values are never scanned for further placeholders. A
//! placeholder without a value is an error, never literal output.
//!
//! ## Example
//!
//! ```
//! use git_versioning::template::{Context, Template};
//!
//! let template = Template::parse("${branch}-SNAPSHOT").unwrap();
//! let mut context = Context::new();
//! context.insert("branch", "main");
//! assert_eq!(template.render(&context).unwrap(), "main-SNAPSHOT");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

impl Template {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns `Error::Template` for an unterminated placeholder, an empty
    /// placeholder, or a placeholder name with characters outside
    /// `[A-Za-z0-9_.-]`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(escaped) = after.strip_prefix("${") {
                literal.push_str("${");
                rest = escaped;
            } else if let Some(body) = after.strip_prefix('{') {
                let end = body.find('}').ok_or_else(|| Error::Template {
                    message: format!("Unterminated placeholder in \"{}\"", source),
                    variable: None,
                })?;
                let name = &body[..end];
                if name.is_empty() {
                    return Err(Error::Template {
                        message: format!("Empty placeholder in \"{}\"", source),
                        variable: None,
                    });
                }
                if !name.chars().all(is_name_char) {
                    return Err(Error::Template {
                        message: format!("Invalid placeholder name in \"{}\"", source),
                        variable: Some(name.to_string()),
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name.to_string()));
                rest = &body[end + 1..];
            } else {
                literal.push('$');
                rest = after;
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text as written in the configuration.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Checks every placeholder against a vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnresolvedPlaceholder` for the first placeholder the
    /// vocabulary does not know.
    pub fn validate(&self, is_known: impl Fn(&str) -> bool) -> Result<()> {
        match self.placeholders().find(|name| !is_known(name)) {
            Some(unknown) => Err(self.unresolved(unknown)),
            None => Ok(()),
        }
    }

    /// Renders the template against a context.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnresolvedPlaceholder` if a placeholder has no value.
    pub fn render(&self, context: &Context) -> Result<String> {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => {
                    let value = context.get(name).ok_or_else(|| self.unresolved(name))?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }

    fn unresolved(&self, name: &str) -> Error {
        Error::UnresolvedPlaceholder {
            placeholder: name.to_string(),
            template: self.source.clone(),
        }
    }
}

impl TryFrom<String> for Template {
    type Error = Error;

    fn try_from(source: String) -> Result<Self> {
        Self::parse(&source)
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.source
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Placeholder values available while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Sets a value only if the name is not yet bound.
    pub fn insert_if_absent(&mut self, name: &str, value: &str) {
        if !self.values.contains_key(name) {
            self.values.insert(name.to_string(), value.to_string());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}
