//! Modules, the transform units of a pipeline.
//!
//! A module is an opaque transformer with a single asynchronous execute
//! operation: it receives a [`ModuleContext`] carrying the current input
//! documents and produces a new document sequence. Within a phase, modules
//! run sequentially, each one's output becoming the next one's input.

mod builtin;
mod chain;
mod context;

pub use builtin::{AddMetadata, CreateDocuments, FnModule, IdentityModule};
pub use chain::execute_module_chain;
pub use context::{ExecutionData, ModuleContext};

use crate::documents::DocumentSeq;
use crate::errors::EngineError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline modules.
#[async_trait]
pub trait Module: Send + Sync + Debug {
    /// Returns the module's type name, used in logs and failure reports.
    fn name(&self) -> &str;

    /// Executes the module against the context's input documents.
    ///
    /// Returning `Ok(None)` is treated as an empty output sequence.
    async fn execute(&self, ctx: &ModuleContext) -> Result<Option<DocumentSeq>, EngineError>;

    /// Releases any resources owned by the module.
    ///
    /// Called when the engine disposes; must be idempotent. The default
    /// does nothing.
    fn dispose(&self) {}
}
