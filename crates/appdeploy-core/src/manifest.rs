//! Resource descriptors parsed from rendered templates

use std::fmt;

use serde::Deserialize;

use crate::{Error, Result};

/// File extension used for persisted artifacts.
pub const ARTIFACT_EXTENSION: &str = "yaml";

/// Identity of one rendered resource: its kind and `metadata.name`.
///
/// A `Manifest` only exists once both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Manifest {
    kind: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    name: Option<String>,
}

impl Manifest {
    /// Build a manifest from its parts, rejecting empty fields.
    ///
    /// `source_name` is the resource name used to tag the error.
    pub fn new(source_name: &str, kind: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let kind = kind.into();
        let name = name.into();
        if kind.is_empty() || name.is_empty() {
            return Err(Error::InvalidManifest {
                name: source_name.to_string(),
            });
        }
        Ok(Self { kind, name })
    }

    /// Decode rendered bytes and validate the result.
    ///
    /// Only the first YAML document identifies the resource; later documents
    /// are carried along in the applied content but not inspected. Malformed
    /// data is a [`Error::Decode`]; well-formed data without a `kind` or
    /// `metadata.name` is an [`Error::InvalidManifest`].
    pub fn parse(source_name: &str, rendered: &[u8]) -> Result<Self> {
        let Some(document) = serde_yaml::Deserializer::from_slice(rendered).next() else {
            return Err(Error::InvalidManifest {
                name: source_name.to_string(),
            });
        };
        let raw = RawManifest::deserialize(document).map_err(|source| Error::Decode {
            name: source_name.to_string(),
            source,
        })?;

        let kind = raw.kind.unwrap_or_default();
        let name = raw.metadata.and_then(|m| m.name).unwrap_or_default();
        Self::new(source_name, kind, name)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical identifier: `lowercase(kind) + "--" + name`.
    ///
    /// Used both as the artifact file stem and as the reconciliation key.
    pub fn identifier(&self) -> String {
        format!("{}--{}", self.kind.to_lowercase(), self.name)
    }

    /// Artifact file name, `<identifier>.yaml`.
    pub fn filename(&self) -> String {
        format!("{}.{}", self.identifier(), ARTIFACT_EXTENSION)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Map an artifact file name back to its canonical identifier.
///
/// Only `<stem>.yaml` names whose stem contains `--` and does not start with
/// a dot are artifacts; everything else returns `None`.
pub fn identifier_from_filename(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(ARTIFACT_EXTENSION)?.strip_suffix('.')?;
    if stem.starts_with('.') || !stem.contains("--") {
        return None;
    }
    Some(stem)
}
