//! The in-memory sample library.
//!
//! [`LibraryStore`] is an append-only, insertion-ordered list of samples.
//! Handles are cheap to clone and share one underlying list; reads may run
//! concurrently with an ingestion run and see it partially applied.

use std::sync::{Arc, PoisonError, RwLock};

use crate::sample::Sample;

/// Shared, append-only collection of samples.
#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    samples: Arc<RwLock<Vec<Arc<Sample>>>>,
}

impl LibraryStore {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample, returning the shared handle stored.
    pub fn push(&self, sample: Sample) -> Arc<Sample> {
        let sample = Arc::new(sample);
        self.samples
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&sample));
        sample
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the library holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Sample>> {
        self.samples
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `f` against the contents under a read lock.
    pub fn with_samples<R>(&self, f: impl FnOnce(&[Arc<Sample>]) -> R) -> R {
        let samples = self.samples.read().unwrap_or_else(PoisonError::into_inner);
        f(&samples)
    }
}
