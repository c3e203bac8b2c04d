//! The init command: write a config file

use std::num::NonZeroUsize;
use std::path::Path;

use colored::Colorize;

use appdeploy_core::Options;
use appdeploy_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Run the init command
pub fn run_init(
    cwd: &Path,
    output: &Path,
    config: &Path,
    jobs: Option<NonZeroUsize>,
    force: bool,
) -> Result<()> {
    let config_path = cwd.join(config);
    if config_path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    let options = Options::write_to_folder(output).with_concurrency(jobs);
    options.save(&NormalizedPath::new(&config_path))?;

    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        config_path.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn init_writes_loadable_config() {
        let temp = TempDir::new().unwrap();

        run_init(temp.path(), Path::new("out"), Path::new("appdeploy.toml"), None, false).unwrap();

        let options = Options::load(&NormalizedPath::new(temp.path().join("appdeploy.toml"))).unwrap();
        assert_eq!(options.output_folder, Some(PathBuf::from("out")));
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("appdeploy.toml"), "# mine").unwrap();

        let result = run_init(temp.path(), Path::new("out"), Path::new("appdeploy.toml"), None, false);
        assert!(result.is_err());

        run_init(temp.path(), Path::new("out"), Path::new("appdeploy.toml"), None, true).unwrap();
        let text = std::fs::read_to_string(temp.path().join("appdeploy.toml")).unwrap();
        assert!(text.contains("write-to-folder"));
    }

    #[test]
    fn init_supports_yaml_config() {
        let temp = TempDir::new().unwrap();

        run_init(
            temp.path(),
            Path::new("out"),
            Path::new("appdeploy.yaml"),
            NonZeroUsize::new(3),
            false,
        )
        .unwrap();

        let options = Options::load(&NormalizedPath::new(temp.path().join("appdeploy.yaml"))).unwrap();
        assert_eq!(options.concurrency, NonZeroUsize::new(3));
    }
}
