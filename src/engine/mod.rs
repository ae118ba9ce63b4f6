//! The engine orchestrator.
//!
//! An [`Engine`] owns the registered pipelines, the shared document store
//! and the phase graph. One call to [`Engine::execute`] performs one run:
//! clean paths, build the graph (once), clear the store, schedule every
//! phase and report per-phase outcomes. The engine is not safe for
//! concurrent `execute` calls; successive runs are serialized by the
//! caller.

mod filesystem;
mod js;
mod settings;

pub use filesystem::{Directory, FileSystem, LocalFileSystem};
pub use js::{
    default_js_engine_name, js_engine_factory, register_js_engine, reset_js_engines,
    set_default_js_engine, JsEngine, JsEngineFactory,
};
pub use settings::{Settings, CLEAN_OUTPUT_PATH};

use crate::cancellation::CancellationToken;
use crate::documents::{DocumentFactory, DocumentStore};
use crate::errors::EngineError;
use crate::events::{clear_event_sink, get_event_sink, set_event_sink, EventSink};
use crate::execution::{run_phases, PhaseGraph, PhaseKind, PhaseStatus, RunContext};
use crate::pipeline::{Pipeline, PipelineCollection};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// The outcome of one phase in a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseResult {
    /// The pipeline name.
    pub pipeline: String,
    /// The phase kind.
    pub phase: PhaseKind,
    /// The terminal status the phase reached.
    pub status: PhaseStatus,
    /// The recorded error message, if the phase failed.
    pub error: Option<String>,
}

/// A snapshot of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// The execution identifier minted for the run.
    pub execution_id: Uuid,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
    /// Per-phase outcomes.
    pub phases: Vec<PhaseResult>,
    /// Whether every phase succeeded.
    pub success: bool,
}

impl ExecutionResult {
    /// Looks up the status of a pipeline phase by case-insensitive name.
    #[must_use]
    pub fn status_of(&self, pipeline: &str, phase: PhaseKind) -> Option<PhaseStatus> {
        self.phases
            .iter()
            .find(|r| r.phase == phase && r.pipeline.eq_ignore_ascii_case(pipeline))
            .map(|r| r.status)
    }
}

/// Builder for engines with injected services.
#[derive(Default)]
pub struct EngineBuilder {
    settings: Settings,
    file_system: Option<Arc<dyn FileSystem>>,
    event_sink: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("settings", &self.settings)
            .field("file_system", &self.file_system)
            .field("event_sink", &self.event_sink.is_some())
            .finish()
    }
}

impl EngineBuilder {
    /// Sets the engine settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the file system collaborator.
    #[must_use]
    pub fn file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(file_system);
        self
    }

    /// Installs an event sink as the process-global sink for the engine's
    /// lifetime. Detached again when the engine is disposed.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> Engine {
        let installed_sink = if let Some(sink) = self.event_sink {
            set_event_sink(sink);
            true
        } else {
            false
        };

        Engine {
            pipelines: PipelineCollection::new(),
            settings: Arc::new(self.settings),
            file_system: self
                .file_system
                .unwrap_or_else(|| Arc::new(LocalFileSystem::new())),
            store: DocumentStore::new(),
            factory: DocumentFactory::new(),
            graph: RwLock::new(None),
            installed_sink,
            disposed: AtomicBool::new(false),
        }
    }
}

/// The static-content generation engine.
#[derive(Debug)]
pub struct Engine {
    pipelines: PipelineCollection,
    settings: Arc<Settings>,
    file_system: Arc<dyn FileSystem>,
    store: DocumentStore,
    factory: DocumentFactory,
    graph: RwLock<Option<Arc<PhaseGraph>>>,
    installed_sink: bool,
    disposed: AtomicBool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with default services.
    #[must_use]
    pub fn new() -> Self {
        EngineBuilder::default().build()
    }

    /// Returns a builder for an engine with injected services.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Registers a pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is invalid or its name is taken.
    pub fn add_pipeline(&mut self, pipeline: Pipeline) -> Result<(), EngineError> {
        self.pipelines.add(pipeline)
    }

    /// Returns the registered pipelines.
    #[must_use]
    pub fn pipelines(&self) -> &PipelineCollection {
        &self.pipelines
    }

    /// Returns the engine settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the shared document store.
    #[must_use]
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Returns the document factory.
    #[must_use]
    pub fn factory(&self) -> &DocumentFactory {
        &self.factory
    }

    /// Returns the file system collaborator.
    #[must_use]
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.file_system
    }

    fn clean_directory(directory: &Directory, label: &str) {
        if directory.exists() {
            if let Err(e) = directory.delete() {
                warn!(
                    path = %directory.path().display(),
                    error = %e,
                    "Failed to clean {} directory", label
                );
            }
        }
    }

    fn phase_graph(&self) -> Result<Arc<PhaseGraph>, EngineError> {
        let mut guard = self.graph.write();
        match guard.as_ref() {
            Some(graph) => Ok(Arc::clone(graph)),
            None => {
                let graph = Arc::new(PhaseGraph::build(&self.pipelines)?);
                *guard = Some(Arc::clone(&graph));
                Ok(graph)
            }
        }
    }

    /// Performs one run.
    ///
    /// Graph-build errors abort the run before any phase executes. Phase
    /// failures do not: downstream phases skip, independent branches keep
    /// running, the first failure is logged, and the returned snapshot
    /// carries every phase's terminal status.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` after [`dispose`](Self::dispose), or a
    /// graph-build error (`UnknownDependency`, `IsolatedDependency`,
    /// `CycleDetected`).
    pub async fn execute(
        &self,
        cancellation: Arc<CancellationToken>,
    ) -> Result<ExecutionResult, EngineError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(EngineError::Disposed);
        }

        if self.pipelines.is_empty() {
            warn!("No pipelines are registered, nothing to execute");
            return Ok(ExecutionResult {
                execution_id: Uuid::new_v4(),
                duration_ms: 0.0,
                phases: Vec::new(),
                success: true,
            });
        }

        for input_path in self.file_system.input_paths() {
            if input_path == self.file_system.output_path() {
                warn!(
                    path = %input_path.display(),
                    "An input path is the same as the output path"
                );
            }
        }

        Self::clean_directory(&self.file_system.temp_directory(), "temp");
        if self.settings.get_bool(CLEAN_OUTPUT_PATH).unwrap_or(false) {
            Self::clean_directory(&self.file_system.output_directory(), "output");
        }

        let graph = self.phase_graph()?;

        let execution_id = Uuid::new_v4();
        let timer = Instant::now();
        info!(
            execution_id = %execution_id,
            "Executing {} pipelines (execution ID {})",
            self.pipelines.len(),
            execution_id
        );
        get_event_sink().try_emit(
            "engine.executing",
            Some(serde_json::json!({
                "execution_id": execution_id,
                "pipelines": self.pipelines.len(),
            })),
        );

        self.store.clear();

        let run = RunContext {
            execution_id,
            store: self.store.clone(),
            factory: self.factory,
            settings: Arc::clone(&self.settings),
            cancellation,
        };

        // Cancellation never surfaces here: nodes record Cancelled and
        // report success to the scheduler, so an error is always a module
        // failure. Individual node statuses carry the detail; the run
        // itself completes.
        if let Err(e) = run_phases(Arc::clone(&graph), run).await {
            error!(execution_id = %execution_id, error = %e, "Execution failed");
            get_event_sink().try_emit(
                "engine.failed",
                Some(serde_json::json!({
                    "execution_id": execution_id,
                    "error": e.to_string(),
                })),
            );
        }

        let duration_ms = timer.elapsed().as_secs_f64() * 1000.0;
        info!(
            execution_id = %execution_id,
            "Finished execution in {} ms", duration_ms as u64
        );
        get_event_sink().try_emit(
            "engine.finished",
            Some(serde_json::json!({
                "execution_id": execution_id,
                "duration_ms": duration_ms,
            })),
        );

        let phases: Vec<PhaseResult> = graph
            .nodes()
            .iter()
            .map(|node| PhaseResult {
                pipeline: node.pipeline().to_string(),
                phase: node.kind(),
                status: node.status(),
                error: node.error(),
            })
            .collect();
        let success = phases.iter().all(|r| r.status.is_success());

        Ok(ExecutionResult {
            execution_id,
            duration_ms,
            phases,
            success,
        })
    }

    /// Disposes the engine.
    ///
    /// Releases module resources, detaches an event sink installed at
    /// construction, cleans the temporary path and marks the engine
    /// disposed. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(graph) = self.graph.read().clone() {
            for node in graph.nodes() {
                node.dispose_modules();
            }
        } else {
            for pipeline in self.pipelines.iter() {
                pipeline.dispose();
            }
        }

        if self.installed_sink {
            clear_event_sink();
        }

        Self::clean_directory(&self.file_system.temp_directory(), "temp");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}
