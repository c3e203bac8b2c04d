//! Targets: where applied manifests are persisted
//!
//! A target is prepared once, receives concurrent `apply` calls from every
//! unit of work, and is cleaned up at most once, after a fully successful
//! pass. Implementations must tolerate concurrent `apply` calls; the
//! orchestrator does not serialize them.

mod folder;

use serde::Serialize;

use crate::Result;
use crate::manifest::Manifest;
use crate::seen::SeenSet;

pub use folder::FolderTarget;

/// What `apply` did to the stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyOutcome {
    /// No artifact existed for this identifier
    Created,
    /// An artifact existed with different content and was replaced
    Updated,
    /// An artifact existed with identical content
    Unchanged,
}

/// Persistent store reconciled by a pass.
pub trait Target: Send + Sync {
    /// Idempotent setup, called once before any `apply`.
    fn prepare(&self) -> Result<()>;

    /// Persist `content` under the manifest's canonical identifier,
    /// replacing whatever was stored there.
    fn apply(&self, manifest: &Manifest, content: &[u8]) -> Result<ApplyOutcome>;

    /// Remove every stored artifact whose identifier is not in `seen` and
    /// return the identifiers removed. Artifacts in `seen` are left alone.
    fn cleanup(&self, seen: &SeenSet) -> Result<Vec<String>>;
}
