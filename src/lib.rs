//! # Quarry
//!
//! A static-content generation engine built around concurrently executed
//! pipelines.
//!
//! A pipeline is a named sequence of four phases (Input, Process,
//! Transform, Output), each running a linear chain of modules over an
//! immutable document sequence. Across pipelines the engine builds a
//! single phase graph: declared dependencies become edges into Process
//! phases, and all non-isolated Transform phases wait behind all
//! non-isolated Process phases so Transform modules can consult the shared
//! document store for any other pipeline's output.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quarry::prelude::*;
//! use std::sync::Arc;
//!
//! let mut engine = Engine::new();
//! engine.add_pipeline(
//!     Pipeline::new("posts")?
//!         .with_input_modules(vec![Arc::new(CreateDocuments::new(["# Hello"]))])
//!         .with_process_modules(vec![Arc::new(AddMetadata::new(
//!             "section",
//!             serde_json::json!("blog"),
//!         ))]),
//! )?;
//!
//! let result = engine.execute(Arc::new(CancellationToken::new())).await?;
//! assert!(result.success);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod documents;
pub mod engine;
pub mod errors;
pub mod events;
pub mod execution;
pub mod modules;
pub mod pipeline;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::documents::{
        ContentProvider, Document, DocumentFactory, DocumentSeq, DocumentStore, FileContent,
        NullContent, StringContent,
    };
    pub use crate::engine::{
        Engine, EngineBuilder, ExecutionResult, FileSystem, LocalFileSystem, PhaseResult,
        Settings, CLEAN_OUTPUT_PATH,
    };
    pub use crate::errors::EngineError;
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::execution::{PhaseKind, PhaseStatus};
    pub use crate::modules::{
        AddMetadata, CreateDocuments, FnModule, IdentityModule, Module, ModuleContext,
    };
    pub use crate::pipeline::{Pipeline, PipelineCollection};
}
