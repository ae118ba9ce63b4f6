//! The phase scheduler.

use super::graph::PhaseGraph;
use super::phase::{PhaseStatus, RunContext};
use crate::errors::EngineError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Runs every phase node of the graph as its own task.
///
/// Nodes are re-armed, then spawned in scheduling order, so every task's
/// upstream receivers exist before the task does. Each task first awaits
/// all of its upstream completion signals without short-circuiting on the
/// first failure (the node decides skip-vs-run only after observing every
/// upstream terminal state), then runs its node. A failed or cancelled
/// node never prevents independent branches from progressing.
///
/// Returns the first module failure, if any; skipped and cancelled nodes
/// are not errors.
pub async fn run_phases(graph: Arc<PhaseGraph>, run: RunContext) -> Result<(), EngineError> {
    let receivers: Vec<watch::Receiver<PhaseStatus>> =
        graph.nodes().iter().map(|node| node.reset()).collect();

    let mut handles = Vec::with_capacity(graph.len());
    for &index in graph.order() {
        let upstream_receivers: Vec<watch::Receiver<PhaseStatus>> = graph
            .node(index)
            .upstream()
            .iter()
            .map(|&up| receivers[up].clone())
            .collect();
        let graph = Arc::clone(&graph);
        let run = run.clone();

        handles.push(tokio::spawn(async move {
            for mut receiver in upstream_receivers {
                // The sender lives inside the upstream node for the whole
                // run, so a closed channel only means the run is being
                // torn down.
                let _ = receiver.wait_for(PhaseStatus::is_terminal).await;
            }

            let node = Arc::clone(graph.node(index));
            match AssertUnwindSafe(node.run(graph.as_ref(), &run))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        pipeline = node.pipeline(),
                        phase = %node.kind(),
                        "Phase panicked"
                    );
                    node.mark_failed("Phase panicked");
                    Err(EngineError::module_failure(
                        format!("{}/{}", node.pipeline(), node.kind()),
                        "phase panicked",
                    ))
                }
            }
        }));
    }

    let mut first_error: Option<EngineError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(join_error) => {
                if first_error.is_none() {
                    first_error = Some(EngineError::module_failure(
                        "scheduler",
                        format!("task join error: {join_error}"),
                    ));
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::documents::{DocumentFactory, DocumentStore};
    use crate::engine::Settings;
    use crate::execution::PhaseKind;
    use crate::modules::{FnModule, Module, ModuleContext};
    use crate::pipeline::{Pipeline, PipelineCollection};
    use uuid::Uuid;

    fn run_context() -> RunContext {
        RunContext {
            execution_id: Uuid::new_v4(),
            store: DocumentStore::new(),
            factory: DocumentFactory::new(),
            settings: Arc::new(Settings::new()),
            cancellation: Arc::new(CancellationToken::new()),
        }
    }

    fn graph_of(pipelines: Vec<Pipeline>) -> Arc<PhaseGraph> {
        let mut collection = PipelineCollection::new();
        for p in pipelines {
            collection.add(p).unwrap();
        }
        Arc::new(PhaseGraph::build(&collection).unwrap())
    }

    #[tokio::test]
    async fn test_all_phases_succeed() {
        let graph = graph_of(vec![Pipeline::new("a").unwrap()]);
        run_phases(Arc::clone(&graph), run_context()).await.unwrap();

        for node in graph.nodes() {
            assert_eq!(node.status(), PhaseStatus::Succeeded);
        }
    }

    #[tokio::test]
    async fn test_failure_returned_and_branch_isolated() {
        let failing: Arc<dyn Module> = Arc::new(FnModule::new("Boom", |_: &ModuleContext| {
            Err(EngineError::InvalidPipeline("synthetic".to_string()))
        }));

        let graph = graph_of(vec![
            Pipeline::new("bad")
                .unwrap()
                .isolated()
                .with_process_modules(vec![failing]),
            Pipeline::new("good").unwrap().isolated(),
        ]);

        let err = run_phases(Arc::clone(&graph), run_context())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ModuleFailure { .. }));

        assert_eq!(
            graph.find("bad", PhaseKind::Process).unwrap().status(),
            PhaseStatus::Failed
        );
        assert_eq!(
            graph.find("bad", PhaseKind::Transform).unwrap().status(),
            PhaseStatus::Skipped
        );
        // The independent pipeline still ran to completion.
        for kind in [
            PhaseKind::Input,
            PhaseKind::Process,
            PhaseKind::Transform,
            PhaseKind::Output,
        ] {
            assert_eq!(
                graph.find("good", kind).unwrap().status(),
                PhaseStatus::Succeeded
            );
        }
    }

    #[tokio::test]
    async fn test_panicking_module_becomes_failure() {
        let panicking: Arc<dyn Module> = Arc::new(FnModule::new("Panics", |_: &ModuleContext| {
            panic!("intentional");
        }));

        let graph = graph_of(vec![Pipeline::new("a")
            .unwrap()
            .with_process_modules(vec![panicking])]);

        let err = run_phases(Arc::clone(&graph), run_context())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ModuleFailure { .. }));

        assert_eq!(
            graph.find("a", PhaseKind::Process).unwrap().status(),
            PhaseStatus::Failed
        );
        assert_eq!(
            graph.find("a", PhaseKind::Output).unwrap().status(),
            PhaseStatus::Skipped
        );
    }

    #[tokio::test]
    async fn test_graph_reusable_across_runs() {
        let graph = graph_of(vec![Pipeline::new("a").unwrap()]);

        run_phases(Arc::clone(&graph), run_context()).await.unwrap();
        run_phases(Arc::clone(&graph), run_context()).await.unwrap();

        for node in graph.nodes() {
            assert_eq!(node.status(), PhaseStatus::Succeeded);
        }
    }
}
