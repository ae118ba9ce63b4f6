//! The document value type.

use super::content::{ContentProvider, NullContent};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// An immutable unit of content flowing through pipelines.
///
/// The engine treats documents as opaque: it never inspects source,
/// destination, metadata or content. Modules that want to change a document
/// create a new one through the [`DocumentFactory`](super::DocumentFactory).
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable identity of this document instance.
    pub id: Uuid,
    /// Where the document came from, if anywhere.
    pub source: Option<PathBuf>,
    /// Where the document is headed, if anywhere.
    pub destination: Option<PathBuf>,
    /// Arbitrary metadata attached to the document.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Provider for the document's content.
    pub content: Arc<dyn ContentProvider>,
}

impl Document {
    /// Creates a new document.
    #[must_use]
    pub fn new(
        source: Option<PathBuf>,
        destination: Option<PathBuf>,
        metadata: HashMap<String, serde_json::Value>,
        content: Arc<dyn ContentProvider>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            destination,
            metadata,
            content,
        }
    }

    /// Creates an empty document with no paths, metadata or content.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(None, None, HashMap::new(), Arc::new(NullContent))
    }

    /// Returns the source path, if set.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns the destination path, if set.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Looks up a metadata value by key.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    /// Looks up a metadata value as a string.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}
