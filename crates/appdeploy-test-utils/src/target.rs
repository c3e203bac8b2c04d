//! In-memory [`Target`] that records every call.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use appdeploy_core::{ApplyOutcome, Error, Manifest, Result, SeenSet, Target};

/// A call received by [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Prepare,
    /// Identifier of the applied manifest
    Apply(String),
    /// Identifiers in the seen set, sorted
    Cleanup(Vec<String>),
}

/// Stores artifacts in a map keyed by canonical identifier.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    stored: Mutex<BTreeMap<String, Vec<u8>>>,
    calls: Mutex<Vec<Call>>,
    fail_prepare: bool,
    fail_cleanup: bool,
    fail_apply: BTreeSet<String>,
    apply_delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an artifact, as if applied by an earlier pass.
    pub fn with_artifact(self, identifier: &str, content: &str) -> Self {
        self.stored
            .lock()
            .unwrap()
            .insert(identifier.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }

    pub fn failing_cleanup(mut self) -> Self {
        self.fail_cleanup = true;
        self
    }

    /// Make `apply` fail for the manifest with this identifier.
    pub fn failing_apply(mut self, identifier: &str) -> Self {
        self.fail_apply.insert(identifier.to_string());
        self
    }

    /// Sleep inside every `apply`, widening the window for overlap.
    pub fn with_apply_delay(mut self, delay: Duration) -> Self {
        self.apply_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn applied(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Apply(id) => Some(id),
                _ => None,
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn cleanups(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Cleanup(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn was_prepared(&self) -> bool {
        self.calls().contains(&Call::Prepare)
    }

    /// Identifiers currently stored.
    pub fn artifacts(&self) -> Vec<String> {
        self.stored.lock().unwrap().keys().cloned().collect()
    }

    pub fn content(&self, identifier: &str) -> Option<String> {
        self.stored
            .lock()
            .unwrap()
            .get(identifier)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Highest number of `apply` calls observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Target for RecordingTarget {
    fn prepare(&self) -> Result<()> {
        self.record(Call::Prepare);
        if self.fail_prepare {
            return Err(Error::target_failed("prepare failed"));
        }
        Ok(())
    }

    fn apply(&self, manifest: &Manifest, content: &[u8]) -> Result<ApplyOutcome> {
        let identifier = manifest.identifier();
        self.record(Call::Apply(identifier.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.apply_delay {
            std::thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_apply.contains(&identifier) {
            return Err(Error::target_failed(format!("cannot apply {identifier}")));
        }

        let mut stored = self.stored.lock().unwrap();
        let outcome = match stored.insert(identifier, content.to_vec()) {
            None => ApplyOutcome::Created,
            Some(previous) if previous == content => ApplyOutcome::Unchanged,
            Some(_) => ApplyOutcome::Updated,
        };
        Ok(outcome)
    }

    fn cleanup(&self, seen: &SeenSet) -> Result<Vec<String>> {
        self.record(Call::Cleanup(seen.identifiers().map(str::to_string).collect()));
        if self.fail_cleanup {
            return Err(Error::target_failed("cleanup failed"));
        }

        let mut stored = self.stored.lock().unwrap();
        let stale: Vec<String> = stored
            .keys()
            .filter(|id| !seen.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            stored.remove(id);
        }
        Ok(stale)
    }
}
