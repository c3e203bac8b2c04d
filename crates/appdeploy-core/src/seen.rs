//! The set of manifests applied during one pass

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::manifest::Manifest;
use crate::{Error, Result};

/// Manifests successfully applied in one pass, keyed by canonical identifier.
///
/// Each identifier maps to the resource name that produced it. Membership is
/// all that matters; iteration is in identifier order no matter which unit
/// finished first.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    entries: BTreeMap<String, String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `resource` produced and applied `manifest`.
    ///
    /// Fails with [`Error::Conflict`] when another resource already claimed
    /// the same identifier.
    pub fn insert(&mut self, resource: &str, manifest: &Manifest) -> Result<()> {
        match self.entries.entry(manifest.identifier()) {
            Entry::Vacant(slot) => {
                slot.insert(resource.to_string());
                Ok(())
            }
            Entry::Occupied(slot) => {
                let existing = slot.get();
                let (first, second) = if existing.as_str() <= resource {
                    (existing.clone(), resource.to_string())
                } else {
                    (resource.to_string(), existing.clone())
                };
                Err(Error::Conflict {
                    identifier: slot.key().clone(),
                    first,
                    second,
                })
            }
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resource name that produced `identifier`.
    pub fn resource_for(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }
}

/// Test-only constructor keyed by each manifest's own name.
///
/// # Panics
/// Panics if two manifests share an identifier.
#[cfg(test)]
impl FromIterator<Manifest> for SeenSet {
    fn from_iter<I: IntoIterator<Item = Manifest>>(iter: I) -> Self {
        let mut set = Self::new();
        for manifest in iter {
            let resource = manifest.name().to_string();
            set.insert(&resource, &manifest).unwrap();
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job(name: &str) -> Manifest {
        Manifest::new(name, "Job", name).unwrap()
    }

    #[test]
    fn iteration_is_by_identifier() {
        let mut seen = SeenSet::new();
        seen.insert("b", &job("b")).unwrap();
        seen.insert("a", &job("a")).unwrap();

        let ids: Vec<_> = seen.identifiers().collect();
        assert_eq!(ids, vec!["job--a", "job--b"]);
        assert_eq!(seen.resource_for("job--b"), Some("b"));
    }

    #[test]
    fn duplicate_identifier_is_conflict() {
        let mut seen = SeenSet::new();
        seen.insert("second.yaml", &job("a")).unwrap();

        let err = seen.insert("first.yaml", &job("a")).unwrap_err();

        match err {
            Error::Conflict {
                identifier,
                first,
                second,
            } => {
                assert_eq!(identifier, "job--a");
                assert_eq!(first, "first.yaml");
                assert_eq!(second, "second.yaml");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(seen.len(), 1);
    }

    #[test]
    #[should_panic]
    fn collecting_duplicates_panics() {
        let _: SeenSet = [job("a"), job("a")].into_iter().collect();
    }
}
