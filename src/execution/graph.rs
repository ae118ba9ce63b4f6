//! Phase graph construction.

use super::phase::{PhaseKind, PhaseNode};
use crate::errors::EngineError;
use crate::modules::Module;
use crate::pipeline::{Pipeline, PipelineCollection};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// The four phase nodes of one pipeline, by arena index.
#[derive(Debug, Clone, Copy)]
struct PhaseGroup {
    input: usize,
    process: usize,
    transform: usize,
    output: usize,
    isolated: bool,
}

/// The phase graph of one engine: an arena of phase nodes plus a scheduling
/// order in which every node appears after all of its upstream nodes.
///
/// Built once per engine and reused across runs.
#[derive(Debug)]
pub struct PhaseGraph {
    nodes: Vec<Arc<PhaseNode>>,
    order: Vec<usize>,
}

impl PhaseGraph {
    /// Builds the phase graph for the registered pipelines.
    ///
    /// Pass 1 visits pipelines depth-first in registration order, creating
    /// four phase nodes per pipeline and wiring dependency edges into each
    /// Process node; cycles, unknown dependencies and dependencies on
    /// isolated pipelines are rejected. Pass 2 extends every non-isolated
    /// Transform node with the Process nodes of every other non-isolated
    /// pipeline, so Transform modules can rely on the shared document store
    /// holding the final Process output of all non-isolated pipelines.
    ///
    /// # Errors
    ///
    /// Returns `UnknownDependency`, `IsolatedDependency` or `CycleDetected`.
    pub fn build(pipelines: &PipelineCollection) -> Result<Self, EngineError> {
        let mut builder = GraphBuilder {
            pipelines,
            nodes: Vec::new(),
            groups: HashMap::new(),
            group_order: Vec::new(),
            visited: HashSet::new(),
        };

        for pipeline in pipelines.iter() {
            builder.visit(pipeline)?;
        }
        builder.add_transform_barrier();

        let order = builder.scheduling_order();
        let nodes = builder.nodes.into_iter().map(Arc::new).collect::<Vec<_>>();

        debug!(
            pipelines = pipelines.len(),
            nodes = nodes.len(),
            "Built phase graph"
        );
        Ok(Self { nodes, order })
    }

    /// Returns the node at the given arena index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds; indices come from upstream
    /// edge sets and the scheduling order, which only hold valid indices.
    #[must_use]
    pub fn node(&self, index: usize) -> &Arc<PhaseNode> {
        &self.nodes[index]
    }

    /// Returns all nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Arc<PhaseNode>] {
        &self.nodes
    }

    /// Returns the scheduling order: all Inputs, then all Processes, then
    /// all Transforms, then all Outputs, in group-visit order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the node of a pipeline phase by case-insensitive name.
    #[must_use]
    pub fn find(&self, pipeline: &str, kind: PhaseKind) -> Option<&Arc<PhaseNode>> {
        self.nodes
            .iter()
            .find(|n| n.kind() == kind && n.pipeline().eq_ignore_ascii_case(pipeline))
    }
}

struct GraphBuilder<'a> {
    pipelines: &'a PipelineCollection,
    nodes: Vec<PhaseNode>,
    groups: HashMap<String, PhaseGroup>,
    group_order: Vec<PhaseGroup>,
    visited: HashSet<String>,
}

impl GraphBuilder<'_> {
    fn add_node(
        &mut self,
        pipeline: &Pipeline,
        kind: PhaseKind,
        modules: Vec<Arc<dyn Module>>,
        upstream: Vec<usize>,
        prev: Option<usize>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(PhaseNode::new(
            pipeline.name.clone(),
            kind,
            pipeline.isolated,
            modules,
            upstream,
            prev,
        ));
        index
    }

    /// Depth-first visit creating the pipeline's phase group.
    ///
    /// A name in the visited set without a recorded group is mid-visit,
    /// which means the recursion re-entered it: a dependency cycle.
    fn visit(&mut self, pipeline: &Pipeline) -> Result<PhaseGroup, EngineError> {
        let key = pipeline.name.to_lowercase();

        if self.visited.contains(&key) {
            return self.groups.get(&key).copied().ok_or_else(|| {
                EngineError::CycleDetected {
                    pipeline: pipeline.name.clone(),
                }
            });
        }
        self.visited.insert(key.clone());

        let group = if pipeline.isolated {
            // Private linear chain: each phase depends only on the previous
            // phase of the same pipeline.
            let input = self.add_node(
                pipeline,
                PhaseKind::Input,
                pipeline.input_modules.clone(),
                Vec::new(),
                None,
            );
            let process = self.add_node(
                pipeline,
                PhaseKind::Process,
                pipeline.process_modules.clone(),
                vec![input],
                Some(input),
            );
            let transform = self.add_node(
                pipeline,
                PhaseKind::Transform,
                pipeline.transform_modules.clone(),
                vec![process],
                Some(process),
            );
            let output = self.add_node(
                pipeline,
                PhaseKind::Output,
                pipeline.output_modules.clone(),
                vec![transform],
                Some(transform),
            );
            PhaseGroup {
                input,
                process,
                transform,
                output,
                isolated: true,
            }
        } else {
            let mut dependencies: Vec<String> = pipeline.dependencies.iter().cloned().collect();
            dependencies.sort();

            let mut dependency_processes = Vec::with_capacity(dependencies.len());
            for dependency in dependencies {
                let dep_pipeline = self.pipelines.get(&dependency).cloned().ok_or_else(|| {
                    EngineError::UnknownDependency {
                        pipeline: pipeline.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                if dep_pipeline.isolated {
                    return Err(EngineError::IsolatedDependency {
                        pipeline: pipeline.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
                let dep_group = self.visit(&dep_pipeline)?;
                dependency_processes.push(dep_group.process);
            }

            let input = self.add_node(
                pipeline,
                PhaseKind::Input,
                pipeline.input_modules.clone(),
                Vec::new(),
                None,
            );
            let mut process_upstream = vec![input];
            process_upstream.extend(dependency_processes);
            let process = self.add_node(
                pipeline,
                PhaseKind::Process,
                pipeline.process_modules.clone(),
                process_upstream,
                Some(input),
            );
            let transform = self.add_node(
                pipeline,
                PhaseKind::Transform,
                pipeline.transform_modules.clone(),
                vec![process],
                Some(process),
            );
            let output = self.add_node(
                pipeline,
                PhaseKind::Output,
                pipeline.output_modules.clone(),
                vec![transform],
                Some(transform),
            );
            PhaseGroup {
                input,
                process,
                transform,
                output,
                isolated: false,
            }
        };

        self.groups.insert(key, group);
        self.group_order.push(group);
        Ok(group)
    }

    /// Pass 2: every non-isolated Transform also waits for the Process of
    /// every other non-isolated pipeline.
    fn add_transform_barrier(&mut self) {
        let non_isolated: Vec<PhaseGroup> = self
            .group_order
            .iter()
            .copied()
            .filter(|g| !g.isolated)
            .collect();

        for group in &non_isolated {
            let others: Vec<usize> = non_isolated
                .iter()
                .filter(|other| other.process != group.process)
                .map(|other| other.process)
                .collect();
            self.nodes[group.transform].extend_upstream(others);
        }
    }

    fn scheduling_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        order.extend(self.group_order.iter().map(|g| g.input));
        order.extend(self.group_order.iter().map(|g| g.process));
        order.extend(self.group_order.iter().map(|g| g.transform));
        order.extend(self.group_order.iter().map(|g| g.output));
        order
    }
}
