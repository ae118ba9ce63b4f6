//! Built-in modules.

use super::{Module, ModuleContext};
use crate::documents::{seq_from, DocumentSeq, StringContent};
use crate::errors::EngineError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Passes its inputs through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityModule;

impl IdentityModule {
    /// Creates a new identity module.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for IdentityModule {
    fn name(&self) -> &str {
        "Identity"
    }

    async fn execute(&self, ctx: &ModuleContext) -> Result<Option<DocumentSeq>, EngineError> {
        Ok(Some(ctx.inputs().clone()))
    }
}

/// A closure-backed module, primarily for embedding and tests.
pub struct FnModule<F>
where
    F: Fn(&ModuleContext) -> Result<Option<DocumentSeq>, EngineError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnModule<F>
where
    F: Fn(&ModuleContext) -> Result<Option<DocumentSeq>, EngineError> + Send + Sync,
{
    /// Creates a new closure-backed module.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnModule<F>
where
    F: Fn(&ModuleContext) -> Result<Option<DocumentSeq>, EngineError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModule").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Module for FnModule<F>
where
    F: Fn(&ModuleContext) -> Result<Option<DocumentSeq>, EngineError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: &ModuleContext) -> Result<Option<DocumentSeq>, EngineError> {
        (self.func)(ctx)
    }
}

/// Seeds a pipeline with documents built from in-memory content.
///
/// Ignores its inputs and emits one document per configured content
/// string. Typically the first module of an Input phase.
#[derive(Debug, Clone, Default)]
pub struct CreateDocuments {
    contents: Vec<String>,
}

impl CreateDocuments {
    /// Creates a module emitting one document per content string.
    #[must_use]
    pub fn new(contents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            contents: contents.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Module for CreateDocuments {
    fn name(&self) -> &str {
        "CreateDocuments"
    }

    async fn execute(&self, ctx: &ModuleContext) -> Result<Option<DocumentSeq>, EngineError> {
        let docs = self
            .contents
            .iter()
            .map(|content| {
                ctx.factory().create(
                    None,
                    None,
                    Default::default(),
                    Arc::new(StringContent::new(content.clone())),
                )
            })
            .collect();
        Ok(Some(seq_from(docs)))
    }
}

/// Stamps a metadata key/value onto every input document.
#[derive(Debug, Clone)]
pub struct AddMetadata {
    key: String,
    value: serde_json::Value,
}

impl AddMetadata {
    /// Creates a module adding the given metadata entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[async_trait]
impl Module for AddMetadata {
    fn name(&self) -> &str {
        "AddMetadata"
    }

    async fn execute(&self, ctx: &ModuleContext) -> Result<Option<DocumentSeq>, EngineError> {
        let docs = ctx
            .inputs()
            .iter()
            .map(|doc| ctx.factory().with_metadata(doc, self.key.as_str(), self.value.clone()))
            .collect();
        Ok(Some(seq_from(docs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::documents::{DocumentFactory, DocumentStore};
    use crate::engine::Settings;
    use crate::execution::PhaseKind;
    use crate::modules::ExecutionData;
    use uuid::Uuid;

    fn test_ctx(inputs: DocumentSeq) -> ModuleContext {
        let data = ExecutionData {
            execution_id: Uuid::new_v4(),
            pipeline: "test".to_string(),
            phase: PhaseKind::Input,
            store: DocumentStore::new(),
            factory: DocumentFactory::new(),
            settings: Arc::new(Settings::new()),
            cancellation: Arc::new(CancellationToken::new()),
        };
        ModuleContext::new(data, None, "test", inputs)
    }

    #[tokio::test]
    async fn test_identity_passes_through() {
        let ctx = test_ctx(crate::documents::empty_seq());
        let output = IdentityModule::new().execute(&ctx).await.unwrap().unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_create_documents() {
        let ctx = test_ctx(crate::documents::empty_seq());
        let module = CreateDocuments::new(["# One", "# Two"]);

        let output = module.execute(&ctx).await.unwrap().unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].content.read_string().await.unwrap(), "# One");
    }

    #[tokio::test]
    async fn test_add_metadata() {
        let ctx = test_ctx(crate::documents::empty_seq());
        let seeded = CreateDocuments::new(["x"]).execute(&ctx).await.unwrap().unwrap();

        let ctx = test_ctx(seeded);
        let module = AddMetadata::new("section", serde_json::json!("blog"));
        let output = module.execute(&ctx).await.unwrap().unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].metadata_str("section"), Some("blog"));
    }

    #[tokio::test]
    async fn test_fn_module() {
        let ctx = test_ctx(crate::documents::empty_seq());
        let module = FnModule::new("Probe", |ctx: &ModuleContext| {
            assert_eq!(ctx.module(), "Probe");
            Ok(None)
        });

        assert_eq!(module.name(), "Probe");
        assert!(module.execute(&ctx).await.unwrap().is_none());
    }
}
