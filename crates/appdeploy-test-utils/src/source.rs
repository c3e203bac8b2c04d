//! In-memory [`ManifestSource`] with fault injection.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use appdeploy_core::{Error, ManifestSource, Result, TemplateStream};

/// Templates held in memory; names are returned sorted.
///
/// Tracks how many streams are open so tests can check that every stream
/// is released, whichever way its unit ends.
#[derive(Debug, Default)]
pub struct MemorySource {
    templates: BTreeMap<String, Vec<u8>>,
    names_error: Option<String>,
    get_errors: BTreeSet<String>,
    read_errors: BTreeSet<String>,
    open: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.templates.insert(name.to_string(), content.into());
        self
    }

    /// Make `names()` fail.
    pub fn failing_names(mut self, message: &str) -> Self {
        self.names_error = Some(message.to_string());
        self
    }

    /// Make `get(name)` fail.
    pub fn failing_get(mut self, name: &str) -> Self {
        self.get_errors.insert(name.to_string());
        self
    }

    /// Make reading the stream for `name` fail.
    pub fn failing_read(mut self, name: &str) -> Self {
        self.read_errors.insert(name.to_string());
        self
    }

    /// Streams handed out and not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Successful `get` calls so far.
    pub fn fetches(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

struct TrackedStream {
    inner: Cursor<Vec<u8>>,
    fail: bool,
    open: Arc<AtomicUsize>,
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::other("stream broke"));
        }
        self.inner.read(buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ManifestSource for MemorySource {
    fn names(&self) -> Result<Vec<String>> {
        if let Some(message) = &self.names_error {
            return Err(Error::source_failed(message.clone()));
        }
        Ok(self.templates.keys().cloned().collect())
    }

    fn get(&self, name: &str) -> Result<TemplateStream<'_>> {
        if self.get_errors.contains(name) {
            return Err(Error::source_failed(format!("cannot fetch {name}")));
        }
        let content = self
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| Error::source_failed(format!("unknown template {name}")))?;

        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedStream {
            inner: Cursor::new(content),
            fail: self.read_errors.contains(name),
            open: Arc::clone(&self.open),
        }))
    }
}
