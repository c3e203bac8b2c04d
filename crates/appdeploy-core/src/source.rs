//! Manifest sources: where resource names and template bytes come from

use std::fs::File;
use std::io::Read;

use appdeploy_fs::{NormalizedPath, io, validate_path_identifier};

use crate::Result;

/// A template stream. Dropping it releases the underlying handle.
pub type TemplateStream<'a> = Box<dyn Read + Send + 'a>;

/// Supplies the resource names for a pass and the template bytes per name.
///
/// `get` is called concurrently from every unit of work, possibly with the
/// same name more than once, so implementations must be `Sync`.
pub trait ManifestSource: Send + Sync {
    /// Every resource name to process in this pass.
    fn names(&self) -> Result<Vec<String>>;

    /// Open the template for `name`.
    fn get(&self, name: &str) -> Result<TemplateStream<'_>>;
}

/// Source backed by a directory of template files.
///
/// Each non-hidden regular file is one resource, named by its file name.
#[derive(Debug, Clone)]
pub struct FolderSource {
    root: NormalizedPath,
}

impl FolderSource {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }
}

impl ManifestSource for FolderSource {
    fn names(&self) -> Result<Vec<String>> {
        let files = io::list_files(&self.root)?;
        Ok(files
            .iter()
            .filter_map(|path| path.file_name().map(str::to_string))
            .collect())
    }

    fn get(&self, name: &str) -> Result<TemplateStream<'_>> {
        validate_path_identifier(name)?;
        let path = self.root.join(name);
        let file = File::open(path.to_native())
            .map_err(|e| appdeploy_fs::Error::io(path.to_native(), e))?;
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn names_lists_visible_files_sorted() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("web.yaml"), "kind: Service").unwrap();
        fs::write(temp.path().join("api.yaml"), "kind: Deployment").unwrap();
        fs::write(temp.path().join(".draft.yaml"), "").unwrap();
        fs::create_dir(temp.path().join("partials")).unwrap();

        let source = FolderSource::new(temp.path());

        assert_eq!(source.names().unwrap(), vec!["api.yaml", "web.yaml"]);
    }

    #[test]
    fn get_streams_file_content() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("web.yaml"), "kind: Service").unwrap();

        let source = FolderSource::new(temp.path());
        let mut content = String::new();
        source
            .get("web.yaml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();

        assert_eq!(content, "kind: Service");
    }

    #[test]
    fn get_rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let source = FolderSource::new(temp.path());

        assert!(matches!(
            source.get("../secrets"),
            Err(Error::Fs(appdeploy_fs::Error::InvalidIdentifier { .. }))
        ));
    }

    #[test]
    fn missing_root_fails_enumeration() {
        let temp = TempDir::new().unwrap();
        let source = FolderSource::new(temp.path().join("missing"));

        assert!(source.names().is_err());
    }
}
