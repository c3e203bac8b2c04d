//! Shared test utilities for the appdeploy workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`source`]: [`MemorySource`], an in-memory manifest source with fault injection
//! - [`target`]: [`RecordingTarget`], an in-memory target that records every call
//! - [`fixtures`]: [`TemplateDir`] and manifest text helpers for on-disk scenarios

pub mod fixtures;
pub mod source;
pub mod target;

pub use fixtures::{TemplateDir, manifest_yaml};
pub use source::MemorySource;
pub use target::{Call, RecordingTarget};
