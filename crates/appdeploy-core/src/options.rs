//! Pass configuration and target selection

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use appdeploy_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::target::{FolderTarget, Target};
use crate::{Error, Result};

/// Where a pass writes its artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One YAML file per resource in `output_folder`.
    WriteToFolder,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "write-to-folder" | "folder" => Ok(Mode::WriteToFolder),
            _ => Err(Error::config(format!("Invalid mode: {}", s))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::WriteToFolder => write!(f, "write-to-folder"),
        }
    }
}

/// Options for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Options {
    /// Target selector; required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Output folder for [`Mode::WriteToFolder`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_folder: Option<PathBuf>,
    /// Maximum simultaneous units of work; unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<NonZeroUsize>,
}

impl Options {
    /// Options for writing into `folder`.
    pub fn write_to_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            mode: Some(Mode::WriteToFolder),
            output_folder: Some(folder.into()),
            concurrency: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: Option<NonZeroUsize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Load options from a TOML, JSON or YAML file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Save options, choosing the format from the file extension.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    /// Construct the configured target, validating the options first.
    pub fn build_target(&self) -> Result<Box<dyn Target>> {
        match self.mode {
            None => Err(Error::config("No deployment mode specified")),
            Some(Mode::WriteToFolder) => {
                let folder = self
                    .output_folder
                    .as_ref()
                    .filter(|folder| !folder.as_os_str().is_empty())
                    .ok_or_else(|| Error::config("No output folder specified"))?;
                Ok(Box::new(FolderTarget::new(folder.as_path())))
            }
        }
    }
}
