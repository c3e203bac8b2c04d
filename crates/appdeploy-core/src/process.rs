//! Orchestration of one reconciliation pass
//!
//! A pass enumerates every resource name, processes each name as an
//! independent unit of work (fetch, render, parse, apply) on a pool of
//! scoped threads, and merges the unit results on the calling thread. The
//! merge side alone owns the seen set and the failure list; units only send
//! their result over a channel.
//!
//! Cleanup runs only after every unit has finished and none has failed.

use std::io::Read;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::vec;

use tracing::{debug, info, warn};

use crate::manifest::Manifest;
use crate::options::Options;
use crate::render::{Context, Renderer, trimmed};
use crate::report::{AppliedResource, ProcessReport};
use crate::seen::SeenSet;
use crate::source::ManifestSource;
use crate::target::{ApplyOutcome, Target};
use crate::{Error, Result};

/// Cooperative cancellation for a running pass.
///
/// Once cancelled, no further units are started; units already running
/// finish, and the pass fails with [`Error::Cancelled`] without cleanup.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of one unit that did not fail.
#[derive(Debug)]
enum UnitOutcome {
    /// Template rendered to nothing
    Skipped,
    Applied {
        manifest: Manifest,
        outcome: ApplyOutcome,
    },
}

type UnitResult = (String, Result<UnitOutcome>);

/// Everything the merge side accumulates while units run.
#[derive(Default)]
struct Collected {
    seen: SeenSet,
    report: ProcessReport,
    failures: Vec<(String, Error)>,
}

impl Collected {
    fn merge(rx: Receiver<UnitResult>) -> Self {
        let mut collected = Self::default();

        for (name, result) in rx {
            match result {
                Ok(UnitOutcome::Skipped) => {
                    debug!(resource = %name, "Rendered empty, skipped");
                    collected.report.skipped.push(name);
                }
                Ok(UnitOutcome::Applied { manifest, outcome }) => {
                    let identifier = manifest.identifier();
                    match collected.seen.insert(&name, &manifest) {
                        Ok(()) => collected.report.applied.push(AppliedResource {
                            resource: name,
                            identifier,
                            outcome,
                        }),
                        Err(e) => {
                            warn!(resource = %name, error = %e, "Identifier conflict");
                            collected.failures.push((name, e));
                        }
                    }
                }
                Err(e) => {
                    warn!(resource = %name, error = %e, "Resource failed");
                    collected.failures.push((name, e));
                }
            }
        }

        collected
    }
}

/// Fold unit failures into one error, ordered by resource name.
fn aggregate(mut failures: Vec<(String, Error)>) -> Error {
    failures.sort_by(|a, b| a.0.cmp(&b.0));
    let mut errors: Vec<Error> = failures.into_iter().map(|(_, e)| e).collect();
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        Error::Multiple { failures: errors }
    }
}

/// Runs passes against one target.
pub struct Processor<'t> {
    target: &'t dyn Target,
    renderer: Renderer,
    concurrency: Option<NonZeroUsize>,
    cancel: CancelToken,
}

impl<'t> Processor<'t> {
    pub fn new(target: &'t dyn Target) -> Self {
        Self {
            target,
            renderer: Renderer::new(),
            concurrency: None,
            cancel: CancelToken::new(),
        }
    }

    /// Cap the number of simultaneous units. `None` starts one per name.
    pub fn with_concurrency(mut self, concurrency: Option<NonZeroUsize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run a full pass: enumerate, prepare, fan out, join, clean up.
    pub fn run(&self, source: &dyn ManifestSource) -> Result<ProcessReport> {
        let names = source.names()?;
        self.run_names(source, names)
    }

    fn run_names(&self, source: &dyn ManifestSource, names: Vec<String>) -> Result<ProcessReport> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        info!(resources = names.len(), "Starting pass");
        self.target.prepare()?;

        let workers = self.worker_count(names.len());
        let queue = Mutex::new(names.into_iter());
        let (tx, rx) = mpsc::channel();

        let collected = thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || self.drain(source, queue, tx));
            }
            drop(tx);
            Collected::merge(rx)
        });

        let Collected {
            seen,
            mut report,
            failures,
        } = collected;

        if !failures.is_empty() {
            warn!(failed = failures.len(), "Pass failed, skipping cleanup");
            return Err(aggregate(failures));
        }
        if self.cancel.is_cancelled() {
            warn!("Pass cancelled, skipping cleanup");
            return Err(Error::Cancelled);
        }

        report.removed = self.target.cleanup(&seen)?;
        report.sort();

        info!(
            seen = seen.len(),
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            removed = report.removed.len(),
            "Pass complete"
        );
        Ok(report)
    }

    fn worker_count(&self, names: usize) -> usize {
        self.concurrency
            .map_or(names, |limit| limit.get().min(names))
    }

    /// Pull names off the shared queue until it is empty or the pass is
    /// cancelled, sending each unit's result to the merge side.
    fn drain(
        &self,
        source: &dyn ManifestSource,
        queue: &Mutex<vec::IntoIter<String>>,
        tx: Sender<UnitResult>,
    ) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
            let Some(name) = next else {
                break;
            };

            let result = self.process_unit(source, &name);
            if tx.send((name, result)).is_err() {
                break;
            }
        }
    }

    /// Fetch, render, parse and apply one resource.
    fn process_unit(&self, source: &dyn ManifestSource, name: &str) -> Result<UnitOutcome> {
        let Some(Rendered { manifest, content }) = render_resource(&self.renderer, source, name)?
        else {
            return Ok(UnitOutcome::Skipped);
        };

        debug!(resource = name, manifest = %manifest, "Applying");
        let outcome = self.target.apply(&manifest, content.as_bytes())?;

        Ok(UnitOutcome::Applied { manifest, outcome })
    }
}

/// A validated, trimmed rendering of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub manifest: Manifest,
    pub content: String,
}

/// Fetch, render and validate `name` without applying it.
///
/// Returns `None` when the template renders to nothing. The template stream
/// is dropped before rendering starts, on success and on error.
pub fn render_resource(
    renderer: &Renderer,
    source: &dyn ManifestSource,
    name: &str,
) -> Result<Option<Rendered>> {
    debug!(resource = name, "Fetching template");
    let raw = {
        let mut stream = source.get(name)?;
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).map_err(|source| Error::Read {
            name: name.to_string(),
            source,
        })?;
        raw
    };

    let rendered = renderer.render(name, &raw, &Context::empty())?;
    let Some(content) = trimmed(&rendered) else {
        return Ok(None);
    };

    let manifest = Manifest::parse(name, content.as_bytes())?;
    Ok(Some(Rendered {
        manifest,
        content: content.to_string(),
    }))
}

/// Run one pass of `source` against the target described by `options`.
pub fn process(source: &dyn ManifestSource, options: &Options) -> Result<ProcessReport> {
    process_with_cancel(source, options, &CancelToken::new())
}

/// Like [`process`], stopping early when `cancel` is triggered.
pub fn process_with_cancel(
    source: &dyn ManifestSource,
    options: &Options,
    cancel: &CancelToken,
) -> Result<ProcessReport> {
    let names = source.names()?;
    let target = options.build_target()?;

    Processor::new(target.as_ref())
        .with_concurrency(options.concurrency)
        .with_cancel(cancel.clone())
        .run_names(source, names)
}
