//! Hybrid score combiner: blends a chunk's vector similarity with the
//! graph score of its bridged nodes via the strategy's learnable alpha.
//!
//! Chunks with no bridge links get a configurable neutral graph score
//! (default 0.5) instead of 0, so unlinked content is not unfairly
//! penalized.

use tracing::debug;

use plexus_core::config::RetrievalConfig;
use plexus_core::errors::PlexusResult;
use plexus_core::traits::{IBridgeIndex, VectorHit};
use plexus_core::types::{ChunkId, NodeId, RelationType, Strategy};

use crate::graph::GraphStore;

/// One chunk scored under one strategy.
#[derive(Debug, Clone)]
pub struct StrategyCandidate {
    pub chunk_id: ChunkId,
    pub vector_score: f64,
    pub graph_score: f64,
    /// `alpha * vector + (1 - alpha) * graph`.
    pub final_score: f64,
    /// Relations on the winning graph path; empty when unlinked or
    /// self-matched.
    pub path_relations: Vec<RelationType>,
    pub hops: usize,
    /// Whether the chunk had any bridge links at all.
    pub linked: bool,
    /// The link that carried the winning graph evidence.
    pub bridge_link: Option<(NodeId, RelationType)>,
}

pub struct HybridCombiner<'a> {
    bridge: &'a dyn IBridgeIndex,
    graph: &'a GraphStore,
    config: &'a RetrievalConfig,
}

impl<'a> HybridCombiner<'a> {
    pub fn new(
        bridge: &'a dyn IBridgeIndex,
        graph: &'a GraphStore,
        config: &'a RetrievalConfig,
    ) -> Self {
        Self {
            bridge,
            graph,
            config,
        }
    }

    /// Combine vector hits with graph evidence under one strategy,
    /// returning candidates ranked by final score (descending, ties by
    /// chunk id).
    pub fn combine(
        &self,
        hits: &[VectorHit],
        anchors: &[NodeId],
        strategy: &Strategy,
        alpha: f64,
    ) -> PlexusResult<Vec<StrategyCandidate>> {
        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            let links = self.bridge.get_nodes_for_chunk(&hit.chunk_id)?;

            let (graph_score, path_relations, hops, linked, bridge_link) = if links.is_empty() {
                (self.config.unlinked_graph_score, Vec::new(), 0, false, None)
            } else {
                // Best bridged node wins: link weight scales the path score.
                let mut best_score = 0.0;
                let mut best_path = Vec::new();
                let mut best_hops = 0;
                let mut best_link = None;
                for link in &links {
                    let path =
                        self.graph
                            .score(anchors, &link.node_id, strategy, self.config.hop_limit);
                    let scored = link.weight.value() * path.score;
                    if scored > best_score {
                        best_score = scored;
                        best_path = path.relations;
                        best_hops = path.hops;
                        best_link = Some((link.node_id.clone(), link.relation));
                    }
                }
                (best_score, best_path, best_hops, true, best_link)
            };

            let final_score = alpha * hit.similarity + (1.0 - alpha) * graph_score;
            candidates.push(StrategyCandidate {
                chunk_id: hit.chunk_id.clone(),
                vector_score: hit.similarity,
                graph_score,
                final_score,
                path_relations,
                hops,
                linked,
                bridge_link,
            });
        }

        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });

        debug!(
            strategy = %strategy.id,
            candidates = candidates.len(),
            alpha,
            "hybrid combination complete"
        );
        Ok(candidates)
    }
}
