//! Phase kinds, statuses and the phase node.

use super::graph::PhaseGraph;
use crate::cancellation::CancellationToken;
use crate::documents::{empty_seq, DocumentFactory, DocumentSeq, DocumentStore};
use crate::engine::Settings;
use crate::errors::EngineError;
use crate::events::get_event_sink;
use crate::modules::{execute_module_chain, ExecutionData, Module};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};
use uuid::Uuid;

/// The four ordered phases of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Gathers the pipeline's initial documents.
    Input,
    /// Produces the documents other pipelines may depend on.
    Process,
    /// Reshapes documents once all non-isolated Process work is visible.
    Transform,
    /// Writes or otherwise consumes the final documents.
    Output,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Process => write!(f, "process"),
            Self::Transform => write!(f, "transform"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// The execution status of a phase node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Not yet started.
    Pending,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Succeeded,
    /// A module failed, aborting the phase.
    Failed,
    /// Skipped because an upstream phase did not succeed.
    Skipped,
    /// Cooperative cancellation was observed.
    Cancelled,
}

impl Default for PhaseStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl PhaseStatus {
    /// Returns true if the status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    /// Returns true if the status is `Succeeded`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Run-scoped data shared by every phase task.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The execution identifier of this run.
    pub execution_id: Uuid,
    /// The shared document store.
    pub store: DocumentStore,
    /// The document factory handed to modules.
    pub factory: DocumentFactory,
    /// Engine settings handed to modules.
    pub settings: Arc<Settings>,
    /// The run's cancellation token.
    pub cancellation: Arc<CancellationToken>,
}

/// One (pipeline, phase-kind) node of the phase graph.
///
/// Nodes live in an arena owned by the graph; upstream edges are arena
/// indices. Status, output and completion signal are re-armed at the start
/// of every run so the graph can be reused across executions.
pub struct PhaseNode {
    pipeline: String,
    kind: PhaseKind,
    isolated: bool,
    modules: Vec<Arc<dyn Module>>,
    upstream: Vec<usize>,
    prev: Option<usize>,
    status: RwLock<PhaseStatus>,
    output: RwLock<DocumentSeq>,
    error: RwLock<Option<String>>,
    signal: RwLock<Option<watch::Sender<PhaseStatus>>>,
}

impl PhaseNode {
    /// Creates a new phase node.
    #[must_use]
    pub fn new(
        pipeline: impl Into<String>,
        kind: PhaseKind,
        isolated: bool,
        modules: Vec<Arc<dyn Module>>,
        upstream: Vec<usize>,
        prev: Option<usize>,
    ) -> Self {
        Self {
            pipeline: pipeline.into(),
            kind,
            isolated,
            modules,
            upstream,
            prev,
            status: RwLock::new(PhaseStatus::Pending),
            output: RwLock::new(empty_seq()),
            error: RwLock::new(None),
            signal: RwLock::new(None),
        }
    }

    /// Returns the owning pipeline's name.
    #[must_use]
    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    /// Returns the phase kind.
    #[must_use]
    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    /// Returns whether the owning pipeline is isolated.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        self.isolated
    }

    /// Returns the arena indices of the upstream nodes.
    #[must_use]
    pub fn upstream(&self) -> &[usize] {
        &self.upstream
    }

    pub(crate) fn extend_upstream(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.upstream.extend(indices);
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> PhaseStatus {
        *self.status.read()
    }

    /// Returns the phase's output document sequence.
    #[must_use]
    pub fn output(&self) -> DocumentSeq {
        self.output.read().clone()
    }

    /// Returns the recorded error message, if the phase failed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    /// Re-arms the node for a new run and returns the completion receiver.
    pub(crate) fn reset(&self) -> watch::Receiver<PhaseStatus> {
        *self.status.write() = PhaseStatus::Pending;
        *self.output.write() = empty_seq();
        *self.error.write() = None;

        let (tx, rx) = watch::channel(PhaseStatus::Pending);
        *self.signal.write() = Some(tx);
        rx
    }

    fn set_status(&self, status: PhaseStatus) {
        *self.status.write() = status;
        if let Some(tx) = self.signal.read().as_ref() {
            let _ = tx.send(status);
        }
    }

    /// Forces the node into `Failed` unless it already reached a terminal
    /// state. Used when a module panics out of the normal failure path.
    pub(crate) fn mark_failed(&self, message: impl Into<String>) {
        if self.status().is_terminal() {
            return;
        }
        *self.error.write() = Some(message.into());
        self.set_status(PhaseStatus::Failed);
    }

    /// Releases module resources.
    pub(crate) fn dispose_modules(&self) {
        for module in &self.modules {
            module.dispose();
        }
    }

    fn emit(&self, run: &RunContext, event_type: &str) {
        get_event_sink().try_emit(
            event_type,
            Some(serde_json::json!({
                "execution_id": run.execution_id,
                "pipeline": self.pipeline,
                "phase": self.kind.to_string(),
            })),
        );
    }

    /// Executes this node's module chain once.
    ///
    /// The scheduler guarantees every upstream node has reached a terminal
    /// state before this is called. Returns an error only for module
    /// failures; skips and cancellations are recorded in the node status
    /// and reported as success to the caller.
    pub async fn run(&self, graph: &PhaseGraph, run: &RunContext) -> Result<(), EngineError> {
        self.set_status(PhaseStatus::Running);

        // Failed, skipped and cancelled upstreams all read the same way:
        // this node cannot run.
        if self
            .upstream
            .iter()
            .any(|&up| !graph.node(up).status().is_success())
        {
            error!(
                pipeline = %self.pipeline,
                phase = %self.kind,
                "Skipping {}/{} due to dependency error", self.pipeline, self.kind
            );
            self.emit(run, "phase.skipped");
            self.set_status(PhaseStatus::Skipped);
            return Ok(());
        }

        if run.cancellation.is_cancelled() {
            self.emit(run, "phase.cancelled");
            self.set_status(PhaseStatus::Cancelled);
            return Ok(());
        }

        let inputs = match self.prev {
            Some(prev) => graph.node(prev).output(),
            None => empty_seq(),
        };

        debug!(
            pipeline = %self.pipeline,
            phase = %self.kind,
            inputs = inputs.len(),
            "Starting phase"
        );
        self.emit(run, "phase.started");

        let data = ExecutionData {
            execution_id: run.execution_id,
            pipeline: self.pipeline.clone(),
            phase: self.kind,
            store: run.store.clone(),
            factory: run.factory,
            settings: Arc::clone(&run.settings),
            cancellation: Arc::clone(&run.cancellation),
        };

        match execute_module_chain(&data, None, &self.modules, inputs).await {
            Ok(outputs) => {
                if self.kind == PhaseKind::Process && !self.isolated {
                    run.store.publish(&self.pipeline, outputs.clone());
                }
                *self.output.write() = outputs;
                self.emit(run, "phase.completed");
                self.set_status(PhaseStatus::Succeeded);
                Ok(())
            }
            Err(EngineError::Cancelled) => {
                self.emit(run, "phase.cancelled");
                self.set_status(PhaseStatus::Cancelled);
                Ok(())
            }
            Err(e) => {
                *self.error.write() = Some(e.to_string());
                self.emit(run, "phase.failed");
                self.set_status(PhaseStatus::Failed);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for PhaseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseNode")
            .field("pipeline", &self.pipeline)
            .field("kind", &self.kind)
            .field("isolated", &self.isolated)
            .field("modules", &self.modules.len())
            .field("upstream", &self.upstream)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_kind_display() {
        assert_eq!(PhaseKind::Input.to_string(), "input");
        assert_eq!(PhaseKind::Process.to_string(), "process");
        assert_eq!(PhaseKind::Transform.to_string(), "transform");
        assert_eq!(PhaseKind::Output.to_string(), "output");
    }

    #[test]
    fn test_phase_kind_ordering() {
        assert!(PhaseKind::Input < PhaseKind::Process);
        assert!(PhaseKind::Process < PhaseKind::Transform);
        assert!(PhaseKind::Transform < PhaseKind::Output);
    }

    #[test]
    fn test_phase_status_terminal() {
        assert!(PhaseStatus::Succeeded.is_terminal());
        assert!(PhaseStatus::Failed.is_terminal());
        assert!(PhaseStatus::Skipped.is_terminal());
        assert!(PhaseStatus::Cancelled.is_terminal());
        assert!(!PhaseStatus::Pending.is_terminal());
        assert!(!PhaseStatus::Running.is_terminal());
    }

    #[test]
    fn test_phase_status_success() {
        assert!(PhaseStatus::Succeeded.is_success());
        assert!(!PhaseStatus::Skipped.is_success());
        assert!(!PhaseStatus::Failed.is_success());
    }

    #[test]
    fn test_phase_status_serialize() {
        let json = serde_json::to_string(&PhaseStatus::Succeeded).unwrap();
        assert_eq!(json, r#""succeeded""#);

        let kind: PhaseKind = serde_json::from_str(r#""transform""#).unwrap();
        assert_eq!(kind, PhaseKind::Transform);
    }

    #[test]
    fn test_node_reset_rearms_state() {
        let node = PhaseNode::new("posts", PhaseKind::Process, false, Vec::new(), Vec::new(), None);
        node.mark_failed("boom");
        assert_eq!(node.status(), PhaseStatus::Failed);
        assert!(node.error().is_some());

        let rx = node.reset();
        assert_eq!(node.status(), PhaseStatus::Pending);
        assert!(node.error().is_none());
        assert_eq!(*rx.borrow(), PhaseStatus::Pending);
    }

    #[test]
    fn test_mark_failed_does_not_override_terminal() {
        let node = PhaseNode::new("posts", PhaseKind::Process, false, Vec::new(), Vec::new(), None);
        let _rx = node.reset();
        node.set_status(PhaseStatus::Succeeded);

        node.mark_failed("late panic");
        assert_eq!(node.status(), PhaseStatus::Succeeded);
        assert!(node.error().is_none());
    }
}
