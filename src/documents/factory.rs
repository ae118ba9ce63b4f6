//! Document factory used by modules to mint new documents.

use super::content::ContentProvider;
use super::document::Document;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Factory for creating documents.
///
/// Modules create documents exclusively through the factory carried by
/// their execution context; the scheduler itself never creates documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFactory;

impl DocumentFactory {
    /// Creates a new factory.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Creates a document.
    #[must_use]
    pub fn create(
        &self,
        source: Option<PathBuf>,
        destination: Option<PathBuf>,
        metadata: HashMap<String, serde_json::Value>,
        content: Arc<dyn ContentProvider>,
    ) -> Arc<Document> {
        Arc::new(Document::new(source, destination, metadata, content))
    }

    /// Creates a document converted into a caller-defined type.
    ///
    /// The type-parameterized counterpart of [`create`](Self::create) for
    /// embedders wrapping documents in richer types.
    #[must_use]
    pub fn create_as<T: From<Document>>(
        &self,
        source: Option<PathBuf>,
        destination: Option<PathBuf>,
        metadata: HashMap<String, serde_json::Value>,
        content: Arc<dyn ContentProvider>,
    ) -> T {
        T::from(Document::new(source, destination, metadata, content))
    }

    /// Creates a copy of a document with one metadata entry added or
    /// replaced.
    #[must_use]
    pub fn with_metadata(
        &self,
        document: &Document,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Arc<Document> {
        let mut metadata = document.metadata.clone();
        metadata.insert(key.into(), value);
        self.create(
            document.source.clone(),
            document.destination.clone(),
            metadata,
            Arc::clone(&document.content),
        )
    }
}
