//! Filesystem layer for appdeploy
//!
//! Provides normalized paths, atomic locked writes, config file handling and
//! the identifier checks used when artifacts are named after resources.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_path_identifier};
