//! Benchmarks for graph construction and engine execution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quarry::execution::PhaseGraph;
use quarry::prelude::*;
use std::sync::Arc;

fn chained_pipelines(count: usize) -> PipelineCollection {
    let mut pipelines = PipelineCollection::new();
    for i in 0..count {
        let mut pipeline = Pipeline::new(format!("pipeline-{i}"))
            .unwrap()
            .with_process_modules(vec![Arc::new(IdentityModule::new())]);
        if i > 0 {
            pipeline = pipeline.with_dependency(format!("pipeline-{}", i - 1));
        }
        pipelines.add(pipeline).unwrap();
    }
    pipelines
}

fn graph_build_benchmark(c: &mut Criterion) {
    let pipelines = chained_pipelines(20);
    c.bench_function("phase_graph_build", |b| {
        b.iter(|| black_box(PhaseGraph::build(&pipelines).unwrap()));
    });
}

fn engine_execute_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut engine = Engine::new();
    for i in 0..5 {
        engine
            .add_pipeline(
                Pipeline::new(format!("pipeline-{i}"))
                    .unwrap()
                    .with_input_modules(vec![Arc::new(CreateDocuments::new(["# bench"]))])
                    .with_process_modules(vec![Arc::new(IdentityModule::new())]),
            )
            .unwrap();
    }

    c.bench_function("engine_execute", |b| {
        b.iter(|| {
            let result = rt
                .block_on(engine.execute(Arc::new(CancellationToken::new())))
                .unwrap();
            black_box(result);
        });
    });
}

criterion_group!(benches, graph_build_benchmark, engine_execute_benchmark);
criterion_main!(benches);
