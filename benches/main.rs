use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pour_solver::generation::{Generator, GeneratorConfig};
use pour_solver::pour::{Params, PourState};
use pour_solver::record_parser;
use pour_solver::solver::{heuristic, order_moves, NoProfile, Solver, TimeoutAbortController};
use std::time::Duration;

fn fixture(index: usize) -> PourState {
    let collection = record_parser::parse(include_str!("../src/test_puzzles/generated.csv"))
        .expect("fixture parses");

    collection.valid_rows[index]
        .decode()
        .expect("fixture decodes")
}

fn pouring(c: &mut Criterion) {
    let mut group = c.benchmark_group("pouring");

    group.bench_function("legal moves", |b| {
        let state = fixture(0);
        b.iter(|| black_box(&state).legal_moves().collect::<Vec<_>>())
    });

    group.bench_function("ordering moves", |b| {
        let state = fixture(0);
        b.iter(|| order_moves(black_box(&state)))
    });

    group.bench_function("heuristic", |b| {
        let state = fixture(1);
        b.iter(|| heuristic(black_box(&state)))
    });

    group.bench_function("pour and refresh locks", |b| {
        b.iter_batched(
            || fixture(1),
            |mut state| state.pour(black_box(0), black_box(4)),
            BatchSize::SmallInput,
        )
    });
}

fn solving(c: &mut Criterion) {
    let mut group = c.benchmark_group("solving");
    group.sample_size(10);

    for &index in &[0, 1, 2] {
        group.bench_function(format!("fixture {}", index), |b| {
            let state = fixture(index);
            b.iter(|| {
                Solver::new(&state).solve::<NoProfile, _>(TimeoutAbortController::duration(
                    Duration::from_secs(5),
                ))
            })
        });
    }

    group.finish();
}

fn generating(c: &mut Criterion) {
    let mut group = c.benchmark_group("generating");
    group.sample_size(10);

    group.bench_function("mixed 4x6", |b| {
        let mut generator = Generator::from_config(Params::new(4, 6, 4), GeneratorConfig::default());
        b.iter(|| generator.make_one(None))
    });

    group.bench_function("scrambled 4x6", |b| {
        let config = GeneratorConfig {
            start_mixed: false,
            mix_min: 20,
            mix_max: 40,
            ..GeneratorConfig::default()
        };
        let mut generator = Generator::from_config(Params::new(4, 6, 4), config);
        b.iter(|| generator.make_one(None))
    });

    group.finish();
}

criterion_group!(benches, pouring, solving, generating);
criterion_main!(benches);
