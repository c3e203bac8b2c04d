//! Folder-backed target
//!
//! Layout: one file per artifact at `<folder>/<lowercase(kind)>--<name>.yaml`.
//! During cleanup a file is considered managed only if
//! [`identifier_from_filename`] recognises it; all other files are ignored.

use appdeploy_fs::checksum::{compute_checksum, compute_file_checksum};
use appdeploy_fs::{NormalizedPath, RobustnessConfig, io, validate_path_identifier};
use tracing::{debug, info};

use super::{ApplyOutcome, Target};
use crate::Result;
use crate::manifest::{Manifest, identifier_from_filename};
use crate::seen::SeenSet;

/// Writes each artifact to its own file inside one folder.
#[derive(Debug, Clone)]
pub struct FolderTarget {
    folder: NormalizedPath,
}

impl FolderTarget {
    pub fn new(folder: impl Into<NormalizedPath>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &NormalizedPath {
        &self.folder
    }

    /// Path of the artifact for `manifest`.
    pub fn artifact_path(&self, manifest: &Manifest) -> Result<NormalizedPath> {
        validate_path_identifier(&manifest.identifier())?;
        Ok(self.folder.join(&manifest.filename()))
    }
}

impl Target for FolderTarget {
    fn prepare(&self) -> Result<()> {
        debug!(folder = %self.folder, "Preparing output folder");
        io::ensure_dir(&self.folder)?;
        Ok(())
    }

    fn apply(&self, manifest: &Manifest, content: &[u8]) -> Result<ApplyOutcome> {
        let path = self.artifact_path(manifest)?;

        let outcome = match compute_file_checksum(path.as_ref()) {
            Ok(existing) if existing == compute_checksum(content) => {
                return Ok(ApplyOutcome::Unchanged);
            }
            Ok(_) => ApplyOutcome::Updated,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ApplyOutcome::Created,
            Err(e) => return Err(appdeploy_fs::Error::io(path.to_native(), e).into()),
        };

        io::write_atomic(&path, content, RobustnessConfig::default())?;
        debug!(path = %path, ?outcome, "Wrote artifact");
        Ok(outcome)
    }

    fn cleanup(&self, seen: &SeenSet) -> Result<Vec<String>> {
        let mut removed = Vec::new();

        for path in io::list_files(&self.folder)? {
            let Some(identifier) = path.file_name().and_then(identifier_from_filename) else {
                continue;
            };
            if seen.contains(identifier) {
                continue;
            }

            let identifier = identifier.to_string();
            if io::remove_locked(&path, RobustnessConfig::default())? {
                info!(path = %path, "Removed stale artifact");
                removed.push(identifier);
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn job(name: &str) -> Manifest {
        Manifest::new(name, "Job", name).unwrap()
    }

    #[test]
    fn prepare_creates_folder() {
        let temp = TempDir::new().unwrap();
        let target = FolderTarget::new(temp.path().join("out").join("nested"));

        target.prepare().unwrap();
        target.prepare().unwrap();

        assert!(target.folder().is_dir());
    }

    #[test]
    fn apply_reports_created_updated_unchanged() {
        let temp = TempDir::new().unwrap();
        let target = FolderTarget::new(temp.path());
        let manifest = job("a");

        assert_eq!(target.apply(&manifest, b"v1").unwrap(), ApplyOutcome::Created);
        assert_eq!(target.apply(&manifest, b"v1").unwrap(), ApplyOutcome::Unchanged);
        assert_eq!(target.apply(&manifest, b"v2").unwrap(), ApplyOutcome::Updated);

        assert_eq!(
            fs::read_to_string(temp.path().join("job--a.yaml")).unwrap(),
            "v2"
        );
    }

    #[test]
    fn apply_rejects_identifier_with_separator() {
        let temp = TempDir::new().unwrap();
        let target = FolderTarget::new(temp.path());
        let manifest = Manifest::new("evil", "Job", "../escape").unwrap();

        assert!(target.apply(&manifest, b"x").is_err());
        assert!(!temp.path().join("escape.yaml").exists());
    }

    #[test]
    fn cleanup_removes_only_unseen_artifacts() {
        let temp = TempDir::new().unwrap();
        let target = FolderTarget::new(temp.path());
        for name in ["a", "b", "c"] {
            target.apply(&job(name), name.as_bytes()).unwrap();
        }
        fs::write(temp.path().join("README.md"), "hands off").unwrap();
        fs::write(temp.path().join("notes.yaml"), "not managed").unwrap();

        let seen: SeenSet = [job("a"), job("c")].into_iter().collect();
        let removed = target.cleanup(&seen).unwrap();

        assert_eq!(removed, vec!["job--b".to_string()]);
        assert!(temp.path().join("job--a.yaml").exists());
        assert!(!temp.path().join("job--b.yaml").exists());
        assert!(temp.path().join("job--c.yaml").exists());
        assert!(temp.path().join("README.md").exists());
        assert!(temp.path().join("notes.yaml").exists());
    }

    #[test]
    fn cleanup_with_everything_seen_removes_nothing() {
        let temp = TempDir::new().unwrap();
        let target = FolderTarget::new(temp.path());
        target.apply(&job("a"), b"a").unwrap();

        let seen: SeenSet = [job("a")].into_iter().collect();

        assert!(target.cleanup(&seen).unwrap().is_empty());
        assert!(temp.path().join("job--a.yaml").exists());
    }
}
