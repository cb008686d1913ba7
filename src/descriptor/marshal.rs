//! Reading and writing descriptor files.
//!
//! The format is chosen by file extension: `.yaml` and `.yml` are YAML,
//! `.json` is JSON. Writes are atomic: the content goes to a temporary file
//! in the target directory which is then renamed over the target, so a
//! reader never observes a half-written descriptor.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::ProjectDescriptor;
use crate::error::{Error, Result};

/// Serialization format of a descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Yaml,
    Json,
}

impl DescriptorFormat {
    /// Determines the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `Error::Descriptor` for any extension other than `yaml`,
    /// `yml` or `json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(DescriptorFormat::Yaml),
            Some("json") => Ok(DescriptorFormat::Json),
            _ => Err(Error::Descriptor {
                path: path.to_path_buf(),
                message: "Unsupported descriptor format, expected .yaml, .yml or .json"
                    .to_string(),
            }),
        }
    }
}

/// Parses descriptor text in the given format.
pub fn parse_str(content: &str, format: DescriptorFormat) -> Result<ProjectDescriptor> {
    match format {
        DescriptorFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        DescriptorFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Renders a descriptor in the given format.
pub fn to_string(descriptor: &ProjectDescriptor, format: DescriptorFormat) -> Result<String> {
    match format {
        DescriptorFormat::Yaml => Ok(serde_yaml::to_string(descriptor)?),
        DescriptorFormat::Json => {
            let mut text = serde_json::to_string_pretty(descriptor)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Reads and parses a descriptor file.
///
/// # Errors
///
/// Returns `Error::Descriptor` naming the file when it cannot be read or
/// parsed.
pub fn parse(path: &Path) -> Result<ProjectDescriptor> {
    let format = DescriptorFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| Error::Descriptor {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_str(&content, format).map_err(|e| Error::Descriptor {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Writes a descriptor to `path` atomically, replacing any existing file.
///
/// The format follows the extension of `path`.
pub fn serialize(descriptor: &ProjectDescriptor, path: &Path) -> Result<()> {
    let text = to_string(descriptor, DescriptorFormat::from_path(path)?)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_error = |e: std::io::Error| Error::Descriptor {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(text.as_bytes()).map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
