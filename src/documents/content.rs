//! Content providers streaming document content on demand.

use crate::errors::EngineError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;

/// Trait for streaming a document's content.
///
/// The engine never reads content itself; providers are invoked by modules
/// (and output writers) when content is actually needed.
#[async_trait]
pub trait ContentProvider: Send + Sync + Debug {
    /// Reads the full content as bytes.
    async fn read(&self) -> Result<Vec<u8>, EngineError>;

    /// Reads the full content as a UTF-8 string.
    async fn read_string(&self) -> Result<String, EngineError> {
        let bytes = self.read().await?;
        String::from_utf8(bytes).map_err(|e| {
            EngineError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// A provider with no content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullContent;

#[async_trait]
impl ContentProvider for NullContent {
    async fn read(&self) -> Result<Vec<u8>, EngineError> {
        Ok(Vec::new())
    }
}

/// In-memory string content.
#[derive(Debug, Clone)]
pub struct StringContent {
    content: String,
}

impl StringContent {
    /// Creates a new string content provider.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl ContentProvider for StringContent {
    async fn read(&self) -> Result<Vec<u8>, EngineError> {
        Ok(self.content.clone().into_bytes())
    }
}

/// Content backed by a file on disk, read lazily.
#[derive(Debug, Clone)]
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    /// Creates a new file content provider.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ContentProvider for FileContent {
    async fn read(&self) -> Result<Vec<u8>, EngineError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}
