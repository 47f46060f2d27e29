use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use astral_core::schema::AnalyticSchemaFactory;
use astral_core::{GraphStore, SchemaFactory};
use astral_plugins::similarity::{jaccard_scores, SimilarityOptions};

/// Deterministic pseudo-random graph: `n` vertices, each with a handful
/// of neighbours drawn from a fixed linear congruential sequence.
fn build_graph(n: u64) -> GraphStore {
    let store = GraphStore::new();
    AnalyticSchemaFactory
        .create_schema()
        .new_graph(&store)
        .expect("schema");

    let vertices: Vec<_> = (0..n).map(|_| store.add_vertex()).collect();
    let mut state = 0x2545_f491_4f6c_dd1du64;
    for &v in &vertices {
        for _ in 0..6 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let w = vertices[(state >> 33) as usize % vertices.len()];
            if w != v {
                store.add_transaction(v, w, false).expect("transaction");
            }
        }
    }
    store
}

fn bench_jaccard(c: &mut Criterion) {
    let mut group = c.benchmark_group("jaccard_scores");
    for n in [100u64, 400] {
        let store = build_graph(n);
        let options = SimilarityOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| jaccard_scores(store, &options).expect("scores"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_jaccard);
criterion_main!(benches);
