//! Summary of a successful pass

use serde::Serialize;

use crate::target::ApplyOutcome;

/// One resource that was rendered, validated and applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedResource {
    /// Source name the template was fetched under
    pub resource: String,
    /// Canonical identifier of the rendered manifest
    pub identifier: String,
    pub outcome: ApplyOutcome,
}

/// What a pass did. All lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub applied: Vec<AppliedResource>,
    /// Resources whose template rendered to nothing
    pub skipped: Vec<String>,
    /// Identifiers removed by cleanup
    pub removed: Vec<String>,
}

impl ProcessReport {
    pub(crate) fn sort(&mut self) {
        self.applied.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.skipped.sort();
        self.removed.sort();
    }

    /// Number of applied resources with the given outcome.
    pub fn count(&self, outcome: ApplyOutcome) -> usize {
        self.applied.iter().filter(|a| a.outcome == outcome).count()
    }

    /// True when the pass left the target exactly as it found it.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.count(ApplyOutcome::Unchanged) == self.applied.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(identifier: &str, outcome: ApplyOutcome) -> AppliedResource {
        AppliedResource {
            resource: identifier.to_string(),
            identifier: identifier.to_string(),
            outcome,
        }
    }

    #[test]
    fn noop_requires_all_unchanged_and_no_removals() {
        let mut report = ProcessReport {
            applied: vec![applied("job--a", ApplyOutcome::Unchanged)],
            ..Default::default()
        };
        assert!(report.is_noop());

        report.removed.push("job--b".into());
        assert!(!report.is_noop());

        report.removed.clear();
        report.applied.push(applied("job--c", ApplyOutcome::Created));
        assert!(!report.is_noop());
        assert_eq!(report.count(ApplyOutcome::Created), 1);
    }

    #[test]
    fn serializes_outcome_lowercase() {
        let report = ProcessReport {
            applied: vec![applied("job--a", ApplyOutcome::Created)],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["applied"][0]["outcome"], "created");
    }
}
