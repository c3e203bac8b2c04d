//! The apply command: one full render-and-reconcile pass

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use colored::Colorize;

use appdeploy_core::{ApplyOutcome, FolderSource, Mode, Options, ProcessReport, process};
use appdeploy_fs::NormalizedPath;

use crate::cli::DEFAULT_CONFIG;
use crate::error::{CliError, Result};

/// Build pass options from an optional config file plus CLI overrides.
///
/// With no explicit `config`, `appdeploy.toml` in `cwd` is used if it exists.
pub fn resolve_options(
    cwd: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    jobs: Option<NonZeroUsize>,
) -> Result<Options> {
    let config_path = match config {
        Some(path) => {
            let path = absolute(cwd, path);
            if !path.exists() {
                return Err(CliError::user(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path)
        }
        None => Some(cwd.join(DEFAULT_CONFIG)).filter(|path| path.exists()),
    };

    let mut options = match config_path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "Loading options");
            Options::load(&NormalizedPath::new(&path))?
        }
        None => Options::default(),
    };

    if let Some(output) = output {
        options.mode = Some(Mode::WriteToFolder);
        options.output_folder = Some(output.to_path_buf());
    }
    if jobs.is_some() {
        options.concurrency = jobs;
    }
    Ok(options)
}

/// Run the apply command
pub fn run_apply(
    cwd: &Path,
    source: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    jobs: Option<NonZeroUsize>,
    json: bool,
) -> Result<()> {
    let mut options = resolve_options(cwd, config, output, jobs)?;
    options.output_folder = options.output_folder.map(|folder| absolute(cwd, &folder));
    let source = FolderSource::new(absolute(cwd, source));

    if !json {
        println!(
            "{} Applying templates from {}...",
            "=>".blue().bold(),
            source.root().as_str().cyan()
        );
    }

    let report = process(&source, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn print_report(report: &ProcessReport) {
    if report.is_noop() {
        println!(
            "{} Already up to date ({} manifests).",
            "OK".green().bold(),
            report.applied.len()
        );
        return;
    }

    for applied in &report.applied {
        match applied.outcome {
            ApplyOutcome::Created => {
                println!("   {} {} ({})", "+".green(), applied.identifier, applied.resource.dimmed());
            }
            ApplyOutcome::Updated => {
                println!("   {} {} ({})", "~".yellow(), applied.identifier, applied.resource.dimmed());
            }
            ApplyOutcome::Unchanged => {}
        }
    }
    for identifier in &report.removed {
        println!("   {} {}", "-".red(), identifier);
    }
    for name in &report.skipped {
        println!("   {} {} renders empty", ".".dimmed(), name.dimmed());
    }

    println!(
        "{} {} created, {} updated, {} unchanged, {} removed.",
        "OK".green().bold(),
        report.count(ApplyOutcome::Created),
        report.count(ApplyOutcome::Updated),
        report.count(ApplyOutcome::Unchanged),
        report.removed.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_flag_selects_folder_mode() {
        let temp = TempDir::new().unwrap();

        let options = resolve_options(temp.path(), None, Some(Path::new("out")), None).unwrap();

        assert_eq!(options.mode, Some(Mode::WriteToFolder));
        assert_eq!(options.output_folder, Some(PathBuf::from("out")));
    }

    #[test]
    fn default_config_is_picked_up() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(DEFAULT_CONFIG),
            "mode = \"write-to-folder\"\noutput-folder = \"rendered\"\nconcurrency = 2\n",
        )
        .unwrap();

        let options = resolve_options(temp.path(), None, None, None).unwrap();

        assert_eq!(options.output_folder, Some(PathBuf::from("rendered")));
        assert_eq!(options.concurrency, NonZeroUsize::new(2));
    }

    #[test]
    fn flags_override_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(DEFAULT_CONFIG),
            "mode = \"write-to-folder\"\noutput-folder = \"rendered\"\nconcurrency = 2\n",
        )
        .unwrap();

        let options = resolve_options(
            temp.path(),
            None,
            Some(Path::new("elsewhere")),
            NonZeroUsize::new(8),
        )
        .unwrap();

        assert_eq!(options.output_folder, Some(PathBuf::from("elsewhere")));
        assert_eq!(options.concurrency, NonZeroUsize::new(8));
    }

    #[test]
    fn missing_explicit_config_is_user_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");

        let err = resolve_options(temp.path(), Some(&missing), None, None).unwrap_err();

        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn no_config_and_no_flags_leaves_mode_unset() {
        let temp = TempDir::new().unwrap();
        let options = resolve_options(temp.path(), None, None, None).unwrap();
        assert_eq!(options, Options::default());
    }
}
