//! On-disk fixtures for template folders and output folders.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest text with the given kind and `metadata.name`.
pub fn manifest_yaml(kind: &str, name: &str) -> String {
    format!("apiVersion: v1\nkind: {kind}\nmetadata:\n  name: {name}\n")
}

/// A temporary directory holding a `templates/` folder and an `out/` folder.
///
/// # Example
///
/// ```rust,no_run
/// use appdeploy_test_utils::{TemplateDir, manifest_yaml};
///
/// let dir = TemplateDir::new();
/// dir.write("a.yaml", &manifest_yaml("Job", "a"));
/// dir.assert_artifact_exists("job--a");
/// ```
pub struct TemplateDir {
    temp_dir: TempDir,
}

impl Default for TemplateDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateDir {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("templates")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn templates(&self) -> PathBuf {
        self.root().join("templates")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("out")
    }

    /// Write (or overwrite) the template `name`.
    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.templates().join(name), content).unwrap();
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.templates().join(name)).unwrap();
    }

    /// Place an artifact file in the output folder directly.
    pub fn seed_artifact(&self, identifier: &str, content: &str) {
        fs::create_dir_all(self.output()).unwrap();
        fs::write(self.output().join(format!("{identifier}.yaml")), content).unwrap();
    }

    /// Identifiers of all `.yaml` artifacts in the output folder, sorted.
    pub fn artifacts(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.output()) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .filter_map(|name| name.strip_suffix(".yaml").map(str::to_string))
            .collect();
        ids.sort();
        ids
    }

    /// # Panics
    /// Panics if `<out>/<identifier>.yaml` does not exist.
    pub fn assert_artifact_exists(&self, identifier: &str) {
        let path = self.output().join(format!("{identifier}.yaml"));
        assert!(path.exists(), "Expected artifact to exist: {}", path.display());
    }

    pub fn artifact_content(&self, identifier: &str) -> String {
        let path = self.output().join(format!("{identifier}.yaml"));
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read artifact: {}", path.display()))
    }
}
