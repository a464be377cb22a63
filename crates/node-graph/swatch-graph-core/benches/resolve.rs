use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swatch_graph_core::{MaterialGraph, MaterialResolver};

fn load(name: &str) -> MaterialGraph {
    let json = swatch_test_fixtures::material_graphs::graph_json(name).expect("load fixture");
    MaterialGraph::from_json_str(&json).expect("fixture graph")
}

fn bench_resolve(c: &mut Criterion) {
    let resolver = MaterialResolver::default();

    for name in ["principled", "groups", "textured"] {
        let graph = load(name);
        c.bench_function(&format!("resolve_all/{name}"), |b| {
            b.iter(|| black_box(resolver.resolve_all(black_box(&graph))))
        });
    }

    let json = swatch_test_fixtures::material_graphs::graph_json("groups").expect("load fixture");
    c.bench_function("load/groups", |b| {
        b.iter(|| MaterialGraph::from_json_str(black_box(&json)).expect("fixture graph"))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
