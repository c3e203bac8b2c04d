//! Render, validate and reconcile resource manifests
//!
//! A pass takes a [`ManifestSource`] of named templates, renders each one
//! with an empty context, validates the result into a [`Manifest`], applies
//! it to a [`Target`], and finally removes from the target every artifact the
//! pass did not produce.
//!
//! ```text
//!   source.names()
//!        |
//!   target.prepare()
//!        |
//!   +----+----+----+        one unit per name (optionally bounded)
//!   |    |    |    |        fetch -> render -> parse -> apply
//!   +----+----+----+
//!        |                  merge results over a channel
//!   target.cleanup(seen)    only when every unit succeeded
//! ```
//!
//! # Example
//!
//! ```no_run
//! use appdeploy_core::{FolderSource, Options, process};
//!
//! fn deploy() -> appdeploy_core::Result<()> {
//!     let source = FolderSource::new("templates");
//!     let report = process(&source, &Options::write_to_folder("manifests"))?;
//!     println!("{} applied, {} removed", report.applied.len(), report.removed.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod manifest;
pub mod options;
pub mod process;
pub mod render;
pub mod report;
pub mod seen;
pub mod source;
pub mod target;

pub use error::{Error, Result};
pub use manifest::Manifest;
pub use options::{Mode, Options};
pub use process::{
    CancelToken, Processor, Rendered, process, process_with_cancel, render_resource,
};
pub use render::{Context, Renderer};
pub use report::{AppliedResource, ProcessReport};
pub use seen::SeenSet;
pub use source::{FolderSource, ManifestSource, TemplateStream};
pub use target::{ApplyOutcome, FolderTarget, Target};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_manifest_display_mentions_resource() {
        let error = Error::InvalidManifest {
            name: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "x: missing type data, not a valid resource manifest"
        );
        assert_eq!(error.resource_name(), Some("x"));
    }

    #[test]
    fn multiple_display_lists_every_failure() {
        let error = Error::Multiple {
            failures: vec![
                Error::InvalidManifest { name: "a".into() },
                Error::config("No output folder specified"),
            ],
        };
        let display = error.to_string();
        assert!(display.starts_with("2 resources failed:"), "got: {}", display);
        assert!(display.contains("a: missing type data"));
        assert!(display.contains("No output folder specified"));
    }
}
