//! Shared document store.

use super::DocumentSeq;
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent mapping from pipeline name to its most recent Process-phase
/// output.
///
/// Keys are case-insensitive. Writers are Process phase nodes of
/// non-isolated pipelines, exactly once per run; readers are Transform- and
/// Output-phase modules. The store is cleared at the start of every run.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    inner: Arc<DashMap<String, DocumentSeq>>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(pipeline: &str) -> String {
        pipeline.to_lowercase()
    }

    /// Publishes the output of a pipeline's Process phase, overwriting any
    /// prior value.
    pub fn publish(&self, pipeline: &str, documents: DocumentSeq) {
        self.inner.insert(Self::key(pipeline), documents);
    }

    /// Returns the published output of a pipeline, if any.
    #[must_use]
    pub fn get(&self, pipeline: &str) -> Option<DocumentSeq> {
        self.inner.get(&Self::key(pipeline)).map(|r| r.clone())
    }

    /// Returns whether the store holds an entry for the pipeline.
    #[must_use]
    pub fn contains(&self, pipeline: &str) -> bool {
        self.inner.contains_key(&Self::key(pipeline))
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Returns the number of published pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
