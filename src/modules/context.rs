//! Execution contexts handed to modules.

use super::chain::execute_module_chain;
use super::Module;
use crate::cancellation::CancellationToken;
use crate::documents::{DocumentFactory, DocumentSeq, DocumentStore};
use crate::engine::Settings;
use crate::errors::EngineError;
use crate::execution::PhaseKind;
use std::sync::Arc;
use uuid::Uuid;

/// Engine-level data shared by every module context of one phase run.
#[derive(Debug, Clone)]
pub struct ExecutionData {
    /// The execution identifier minted for this run.
    pub execution_id: Uuid,
    /// The pipeline owning the current phase.
    pub pipeline: String,
    /// The phase kind being executed.
    pub phase: PhaseKind,
    /// The shared document store.
    pub store: DocumentStore,
    /// The document factory.
    pub factory: DocumentFactory,
    /// Engine settings.
    pub settings: Arc<Settings>,
    /// The run's cancellation token.
    pub cancellation: Arc<CancellationToken>,
}

/// The per-module execution context.
///
/// Bundles the run's shared data with the module's identity, its current
/// inputs, and an optional parent context when the module is executed as
/// part of a nested child chain.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    data: ExecutionData,
    parent: Option<Arc<ModuleContext>>,
    module: String,
    inputs: DocumentSeq,
}

impl ModuleContext {
    /// Creates a new module context.
    #[must_use]
    pub fn new(
        data: ExecutionData,
        parent: Option<Arc<ModuleContext>>,
        module: impl Into<String>,
        inputs: DocumentSeq,
    ) -> Self {
        Self {
            data,
            parent,
            module: module.into(),
            inputs,
        }
    }

    /// Returns the input documents for the current module.
    #[must_use]
    pub fn inputs(&self) -> &DocumentSeq {
        &self.inputs
    }

    /// Returns the shared document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.data.store
    }

    /// Returns the document factory.
    #[must_use]
    pub fn factory(&self) -> &DocumentFactory {
        &self.data.factory
    }

    /// Returns the engine settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.data.settings
    }

    /// Returns the pipeline name of the executing phase.
    #[must_use]
    pub fn pipeline(&self) -> &str {
        &self.data.pipeline
    }

    /// Returns the kind of the executing phase.
    #[must_use]
    pub fn phase(&self) -> PhaseKind {
        self.data.phase
    }

    /// Returns the execution identifier of the current run.
    #[must_use]
    pub fn execution_id(&self) -> Uuid {
        self.data.execution_id
    }

    /// Returns the name of the executing module.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the parent context when executing inside a nested chain.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ModuleContext>> {
        self.parent.as_ref()
    }

    /// Returns the run's cancellation token.
    ///
    /// Modules performing suspending work observe this token themselves.
    #[must_use]
    pub fn cancellation(&self) -> &Arc<CancellationToken> {
        &self.data.cancellation
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.data.cancellation.is_cancelled()
    }

    /// Runs a child module chain with this context as parent.
    ///
    /// Container modules use this to thread documents through nested
    /// module lists; the child chain observes the same cancellation token
    /// and shared store.
    pub async fn execute_modules(
        &self,
        modules: &[Arc<dyn Module>],
        inputs: DocumentSeq,
    ) -> Result<DocumentSeq, EngineError> {
        execute_module_chain(
            &self.data,
            Some(Arc::new(self.clone())),
            modules,
            inputs,
        )
        .await
    }
}
