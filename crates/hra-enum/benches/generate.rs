use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hra_core::{Edge, Regulation};
use hra_enum::{expand, generate_hras, ExpandOpts};
use hra_graph::RegulatoryGraph;

fn generate_bench(c: &mut Criterion) {
    c.bench_function("generate_n3", |b| {
        b.iter(|| black_box(generate_hras(3).unwrap().hras.len()));
    });
}

fn expand_bench(c: &mut Criterion) {
    let base = RegulatoryGraph::from_edges(
        3,
        [
            Edge::new(0, 1, Regulation::Gray),
            Edge::new(1, 2, Regulation::Gray),
            Edge::new(2, 0, Regulation::Gray),
        ],
    )
    .unwrap();
    let opts = ExpandOpts::default();
    c.bench_function("expand_cycle_n3_to_n4", |b| {
        b.iter(|| black_box(expand(&base, 0, 4, &opts).unwrap().graphs.len()));
    });
}

criterion_group!(benches, generate_bench, expand_bench);
criterion_main!(benches);
