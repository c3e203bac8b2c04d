//! CLI argument parsing using clap derive

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "appdeploy.toml";

/// appdeploy - Render resource templates and reconcile an output folder
#[derive(Parser, Debug)]
#[command(name = "appdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Render every template and reconcile the output folder
    ///
    /// Writes one `<kind>--<name>.yaml` file per rendered manifest and
    /// removes files left over from earlier runs. Nothing is removed if any
    /// template fails.
    ///
    /// Examples:
    ///   appdeploy apply --source templates --output manifests
    ///   appdeploy apply --source templates --jobs 4 --json
    Apply {
        /// Folder of resource templates
        #[arg(short, long, env = "APPDEPLOY_SOURCE")]
        source: PathBuf,

        /// Output folder (overrides the config file)
        #[arg(short, long, env = "APPDEPLOY_OUTPUT")]
        output: Option<PathBuf>,

        /// Config file (defaults to ./appdeploy.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of templates processed at once
        #[arg(short, long)]
        jobs: Option<NonZeroUsize>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render and validate a single template without writing anything
    Render {
        /// Folder of resource templates
        #[arg(short, long, env = "APPDEPLOY_SOURCE")]
        source: PathBuf,

        /// Template name (file name inside the source folder)
        name: String,
    },

    /// Write a config file for `apply`
    Init {
        /// Output folder to record
        #[arg(short, long, default_value = "manifests")]
        output: PathBuf,

        /// Where to write the config
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Maximum number of templates processed at once
        #[arg(short, long)]
        jobs: Option<NonZeroUsize>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}
