use criterion::{criterion_group, criterion_main, Criterion};

use plexus_core::priors::default_strategy;
use plexus_core::types::{GraphNode, NodeId, NodeType, RelationType, StrategyId};
use plexus_retrieval::GraphStore;

/// Chain-of-rings graph: each node links forward and into a small cycle,
/// roughly the shape ingestion produces for narrative content.
fn build_graph(nodes: usize) -> GraphStore {
    let mut store = GraphStore::new();
    for i in 0..nodes {
        let mut node = GraphNode::new(format!("n{i}"), NodeType::Concept)
            .with_edge(format!("n{}", (i + 1) % nodes), RelationType::Follows)
            .with_edge(format!("n{}", (i + 7) % nodes), RelationType::References);
        if i % 3 == 0 {
            node = node.with_edge(format!("n{}", (i + 2) % nodes), RelationType::Defines);
        }
        store.insert(&node);
    }
    store
}

fn bench_score(c: &mut Criterion) {
    let store = build_graph(1_000);
    let strategy = default_strategy(StrategyId::Semantic);
    let anchors: Vec<NodeId> = vec!["n0".into(), "n100".into(), "n500".into()];

    c.bench_function("graph_score_hop3_1k_nodes", |b| {
        b.iter(|| {
            std::hint::black_box(store.score(
                &anchors,
                &"n105".into(),
                &strategy,
                3,
            ))
        })
    });
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
