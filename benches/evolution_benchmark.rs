use arbor_gp::evaluation::evaluate;
use arbor_gp::{Dataset, EngineConfig, EvolutionEngine, FitnessCase};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

// Helper to create a minimal but realistic test setup
fn setup_engine() -> EvolutionEngine {
    let cases = (0..100)
        .map(|i| {
            let x = i as f64 / 10.0;
            FitnessCase {
                inputs: vec![x, x.sin()],
                target: x * x + 2.0 * x.sin() - 1.0,
            }
        })
        .collect();
    let dataset = Dataset::new(cases, 2, -5.0, 5.0).unwrap();
    let config = EngineConfig {
        pop_size: 1000,
        ..EngineConfig::default()
    };
    EvolutionEngine::new(config, Arc::new(dataset)).unwrap()
}

fn benchmark_evolve(c: &mut Criterion) {
    let engine = setup_engine();

    let mut group = c.benchmark_group("EvolutionEngine Performance");
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("evolve_one_generation", |b| {
        // `clone` resets the population so every run evolves the same generation
        b.iter(|| {
            let mut cloned_engine = engine.clone();
            cloned_engine.evolve();
            cloned_engine.best()
        })
    });

    group.bench_function("evaluate_best_program", |b| {
        let best = engine.individual(engine.best()).unwrap();
        b.iter(|| evaluate(best.program(), engine.dataset()))
    });

    group.finish();
}

criterion_group!(benches, benchmark_evolve);
criterion_main!(benches);
