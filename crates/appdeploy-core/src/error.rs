//! Error types for appdeploy-core

/// Result type for appdeploy-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing a pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Options are missing or inconsistent; raised before any side effect
    #[error("{message}")]
    Config { message: String },

    /// The manifest source failed to enumerate or open a resource
    #[error("Source error: {message}")]
    Source { message: String },

    /// Reading a resource's template stream failed
    #[error("{name}: failed to read template: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Template bytes are not valid UTF-8
    #[error("{name}: template is not valid UTF-8: {source}")]
    Encoding {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Template failed to parse or execute
    #[error("{name}: failed to render template: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Rendered output is not well-formed structured data
    #[error("{name}: failed to decode manifest: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Rendered output decoded but lacks `kind` or `metadata.name`
    #[error("{name}: missing type data, not a valid resource manifest")]
    InvalidManifest { name: String },

    /// The target failed to prepare, apply or clean up
    #[error("Target error: {message}")]
    Target { message: String },

    /// Two resources rendered to the same canonical identifier
    #[error("{identifier} is produced by both {first} and {second}")]
    Conflict {
        identifier: String,
        first: String,
        second: String,
    },

    /// The pass was cancelled before every resource was processed
    #[error("Processing cancelled before all resources were applied")]
    Cancelled,

    /// Several resources failed; sorted by resource name
    #[error("{} resources failed: {}", .failures.len(), join_failures(.failures))]
    Multiple { failures: Vec<Error> },

    /// Filesystem error from appdeploy-fs
    #[error(transparent)]
    Fs(#[from] appdeploy_fs::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    pub fn target_failed(message: impl Into<String>) -> Self {
        Self::Target {
            message: message.into(),
        }
    }

    /// Name of the resource this error is tagged with, if any.
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            Self::Read { name, .. }
            | Self::Encoding { name, .. }
            | Self::Render { name, .. }
            | Self::Decode { name, .. }
            | Self::InvalidManifest { name } => Some(name),
            _ => None,
        }
    }
}

fn join_failures(failures: &[Error]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
