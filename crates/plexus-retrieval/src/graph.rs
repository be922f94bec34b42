//! Per-strategy weighted path scoring from anchor nodes to candidates.
//!
//! A candidate scores the maximum over anchors of (product of per-edge
//! traversal weights along the best path) / (1 + hop count), within a
//! bounded hop limit. Ties break by fewer hops, then lexicographic anchor
//! id. No path within the limit scores 0 (not an error); a candidate that
//! is itself an anchor scores 1.0 at hop 0.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use plexus_core::types::{GraphNode, NodeId, RelationType, Strategy};

/// Best-path score for one (anchors, candidate) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PathScore {
    pub score: f64,
    pub hops: usize,
    /// Relations traversed on the winning path, anchor first.
    pub relations: Vec<RelationType>,
}

impl PathScore {
    fn zero() -> Self {
        Self {
            score: 0.0,
            hops: 0,
            relations: Vec::new(),
        }
    }
}

/// Immutable knowledge-graph adjacency. Nodes and edges are produced by
/// the ingestion pipeline; this store only answers traversal queries.
#[derive(Default)]
pub struct GraphStore {
    graph: DiGraph<NodeId, RelationType>,
    index: HashMap<NodeId, NodeIndex>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and its outgoing edges. Edge targets that have not
    /// been inserted yet get a placeholder entry filled in when they are.
    pub fn insert(&mut self, node: &GraphNode) {
        let source = self.ensure(&node.id);
        for edge in &node.edges {
            let target = self.ensure(&edge.target);
            // Idempotent re-ingestion: skip duplicate edges.
            if !self
                .graph
                .edges_connecting(source, target)
                .any(|e| *e.weight() == edge.relation)
            {
                self.graph.add_edge(source, target, edge.relation);
            }
        }
    }

    fn ensure(&mut self, id: &NodeId) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.index.insert(id.clone(), idx);
        idx
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Score a candidate node against a set of anchors under one
    /// strategy's traversal weights.
    pub fn score(
        &self,
        anchors: &[NodeId],
        candidate: &NodeId,
        strategy: &Strategy,
        hop_limit: usize,
    ) -> PathScore {
        // Self-match short-circuits at hop 0.
        if anchors.contains(candidate) {
            return PathScore {
                score: 1.0,
                hops: 0,
                relations: Vec::new(),
            };
        }

        let Some(&candidate_idx) = self.index.get(candidate) else {
            return PathScore::zero();
        };

        // Sorted anchor order makes the lexicographic tie-break
        // deterministic: an equal-scoring later anchor never replaces an
        // earlier one.
        let mut sorted_anchors: Vec<&NodeId> = anchors.iter().collect();
        sorted_anchors.sort();
        sorted_anchors.dedup();

        let mut best = PathScore::zero();
        for anchor in sorted_anchors {
            let Some(&anchor_idx) = self.index.get(anchor) else {
                continue;
            };
            if let Some(found) = self.best_path(anchor_idx, candidate_idx, strategy, hop_limit) {
                let replace = found.score > best.score + f64::EPSILON
                    || ((found.score - best.score).abs() <= f64::EPSILON
                        && found.score > 0.0
                        && found.hops < best.hops);
                if replace {
                    best = found;
                }
            }
        }
        best
    }

    /// Layered dynamic program: `best[node]` at each hop depth holds the
    /// maximum edge-weight product (and its path) reaching that node.
    /// The returned score maximizes `product / (1 + hops)` over depths.
    fn best_path(
        &self,
        anchor: NodeIndex,
        candidate: NodeIndex,
        strategy: &Strategy,
        hop_limit: usize,
    ) -> Option<PathScore> {
        let mut frontier: HashMap<NodeIndex, (f64, Vec<RelationType>)> = HashMap::new();
        frontier.insert(anchor, (1.0, Vec::new()));

        let mut best: Option<PathScore> = None;

        for hop in 1..=hop_limit {
            let mut next: HashMap<NodeIndex, (f64, Vec<RelationType>)> = HashMap::new();
            for (&node, (product, relations)) in &frontier {
                for edge in self.graph.edges(node) {
                    let Some(weight) = strategy.traversal_weight(*edge.weight()) else {
                        continue;
                    };
                    let new_product = product * weight.value();
                    let entry = next.entry(edge.target());
                    match entry {
                        std::collections::hash_map::Entry::Occupied(mut o) => {
                            if new_product > o.get().0 {
                                let mut path = relations.clone();
                                path.push(*edge.weight());
                                o.insert((new_product, path));
                            }
                        }
                        std::collections::hash_map::Entry::Vacant(v) => {
                            let mut path = relations.clone();
                            path.push(*edge.weight());
                            v.insert((new_product, path));
                        }
                    }
                }
            }

            if let Some((product, relations)) = next.get(&candidate) {
                let score = product / (1.0 + hop as f64);
                let replace = match &best {
                    None => true,
                    // Strictly better only: at equal score the shallower
                    // (earlier) depth wins.
                    Some(b) => score > b.score + f64::EPSILON,
                };
                if replace {
                    best = Some(PathScore {
                        score,
                        hops: hop,
                        relations: relations.clone(),
                    });
                }
            }
            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }
        best
    }
}
