//! appdeploy CLI
//!
//! Renders a folder of resource templates and reconciles an output folder.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {}", e)))?;
        tracing::debug!("Verbose mode enabled");
    }

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    match cmd {
        Commands::Apply {
            source,
            output,
            config,
            jobs,
            json,
        } => commands::run_apply(
            &cwd,
            &source,
            output.as_deref(),
            config.as_deref(),
            jobs,
            json,
        ),
        Commands::Render { source, name } => commands::run_render(&cwd, &source, &name),
        Commands::Init {
            output,
            config,
            jobs,
            force,
        } => commands::run_init(&cwd, &output, &config, jobs, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appdeploy_test_utils::{TemplateDir, manifest_yaml};

    #[test]
    fn test_apply_with_temp_dirs() {
        let dir = TemplateDir::new();
        dir.write("a.yaml", &manifest_yaml("Job", "a"));

        let result = commands::run_apply(
            dir.root(),
            std::path::Path::new("templates"),
            Some(std::path::Path::new("out")),
            None,
            None,
            false,
        );

        assert!(result.is_ok(), "{:?}", result);
        dir.assert_artifact_exists("job--a");
    }

    #[test]
    fn test_apply_without_output_is_config_error() {
        let dir = TemplateDir::new();
        dir.write("a.yaml", &manifest_yaml("Job", "a"));

        let err = commands::run_apply(
            dir.root(),
            std::path::Path::new("templates"),
            None,
            None,
            None,
            true,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "No deployment mode specified");
    }

    #[test]
    fn test_render_single_template() {
        let dir = TemplateDir::new();
        dir.write("a.yaml", &manifest_yaml("Job", "a"));

        let result = commands::run_render(dir.root(), std::path::Path::new("templates"), "a.yaml");
        assert!(result.is_ok());
        assert!(dir.artifacts().is_empty());
    }

    #[test]
    fn test_cli_error_user() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
