use std::collections::{BTreeMap, BTreeSet};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pubnet_core::network::{EdgeSet, Network, NodeSet};
use pubnet_core::properties::{NodeId, OverlapMetric, Representation};

/// Deterministic synthetic corpus: every publication gets three authors
/// drawn from a multiplicative congruential sequence.
fn synthetic_network(
    publications: usize,
    authors: usize,
    representation: Representation,
) -> Network {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state
    };

    let publication_ids: Vec<NodeId> = (0..publications as NodeId).collect();
    let author_ids: Vec<NodeId> = (0..authors as NodeId).collect();

    let mut pairs = Vec::with_capacity(publications * 3);
    for publication in &publication_ids {
        for _ in 0..3 {
            let author = (next() % authors as u64) as NodeId;
            pairs.push((author, *publication));
        }
    }

    let publication_nodes =
        NodeSet::new("Publication".to_string(), publication_ids, BTreeMap::new()).unwrap();
    let author_nodes = NodeSet::new("Author".to_string(), author_ids, BTreeMap::new()).unwrap();
    let edges = EdgeSet::from_pairs("Author", "Publication", false, pairs, representation);

    Network::from_parts(
        "Publication",
        Some("synthetic".to_string()),
        vec![publication_nodes, author_nodes],
        vec![edges],
    )
    .unwrap()
}

fn bench_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice");
    for representation in [Representation::Array, Representation::Graph] {
        let net = synthetic_network(10_000, 2_000, representation);
        let keep: BTreeSet<NodeId> = (0..500).collect();
        group.bench_function(format!("10k_pubs_{representation}"), |b| {
            b.iter(|| net.slice(black_box(&keep)).unwrap())
        });
    }
    group.finish();
}

fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap");
    group.sample_size(10);
    for representation in [Representation::Array, Representation::Graph] {
        let net = synthetic_network(2_000, 500, representation);
        let edges = net.edge("Author", "Publication").unwrap();
        group.bench_function(format!("2k_pubs_{representation}"), |b| {
            b.iter(|| {
                // A fresh instance each iteration so the per-instance cache
                // never engages.
                edges
                    .clone()
                    .overlap(black_box("Author"), OverlapMetric::Count)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let net = synthetic_network(10_000, 2_000, Representation::Array);
    let edges = net.edge("Author", "Publication").unwrap();
    c.bench_function("convert_30k_rows_to_graph", |b| {
        b.iter(|| edges.clone().convert_to(black_box(Representation::Graph)))
    });
}

criterion_group!(benches, bench_slice, bench_overlap, bench_convert);
criterion_main!(benches);
