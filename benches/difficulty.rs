//! Benchmarks for the per-query work the router does before any backend call.
//!
//! Difficulty estimation and lexical verification run on every query and
//! should stay well under a millisecond.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frugal::routing::{DifficultyEstimator, ResponseVerifier};

const QUERIES: &[(&str, &str)] = &[
    ("easy", "What is Python?"),
    ("medium", "Explain the difference between Python and Java"),
    (
        "multi_part",
        "What are the advantages and disadvantages of deep learning?",
    ),
    ("hard", "Prove that the halting problem is undecidable"),
];

fn bench_estimate_by_tier(c: &mut Criterion) {
    let estimator = DifficultyEstimator::new();
    let mut group = c.benchmark_group("estimate");

    for (label, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(label), query, |b, q| {
            b.iter(|| estimator.estimate(black_box(q)))
        });
    }

    group.finish();
}

fn bench_estimate_by_length(c: &mut Criterion) {
    let estimator = DifficultyEstimator::new();
    let mut group = c.benchmark_group("estimate_length");

    for words in [5, 30, 200, 1000] {
        let query = "explain why rust and go differ because ".repeat(words / 7 + 1);
        group.bench_with_input(BenchmarkId::from_parameter(words), &query, |b, q| {
            b.iter(|| estimator.estimate(black_box(q)))
        });
    }

    group.finish();
}

fn bench_lexical_verify(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let verifier = ResponseVerifier::new();
    let answer = "Python is dynamically typed while Java is statically typed. ".repeat(8);

    c.bench_function("verify_lexical_medium", |b| {
        b.iter(|| {
            runtime.block_on(verifier.verify(
                black_box(&answer),
                120,
                256,
                Some("Explain the difference between Python and Java"),
                0.345,
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_estimate_by_tier,
    bench_estimate_by_length,
    bench_lexical_verify
);
criterion_main!(benches);
