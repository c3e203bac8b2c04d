//! The outcome of a pass does not depend on scheduling.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use appdeploy_core::Processor;
use appdeploy_test_utils::{MemorySource, RecordingTarget, manifest_yaml};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn seen_set_matches_non_empty_renders(
        resources in prop::collection::btree_map("[a-z]{1,8}", any::<bool>(), 0..30),
        bound in prop::option::of(1usize..8),
    ) {
        let resources: BTreeMap<String, bool> = resources;
        let mut source = MemorySource::new();
        for (name, renders) in &resources {
            let template = if *renders {
                manifest_yaml("Job", name)
            } else {
                "{% if false %}kind: Job{% endif %}".to_string()
            };
            source = source.with_template(name, template);
        }
        let target = RecordingTarget::new().with_artifact("secret--stale", "x");

        let report = Processor::new(&target)
            .with_concurrency(bound.and_then(NonZeroUsize::new))
            .run(&source)
            .unwrap();

        let expected: Vec<String> = resources
            .iter()
            .filter(|(_, renders)| **renders)
            .map(|(name, _)| format!("job--{name}"))
            .collect();
        let skipped: Vec<String> = resources
            .iter()
            .filter(|(_, renders)| !**renders)
            .map(|(name, _)| name.clone())
            .collect();

        prop_assert_eq!(target.cleanups(), vec![expected.clone()]);
        prop_assert_eq!(target.artifacts(), expected);
        prop_assert_eq!(report.skipped, skipped);
        prop_assert_eq!(report.removed, vec!["secret--stale".to_string()]);
    }
}
