//! RetrievalEngine: orchestrates one query across the strategy set.
//!
//! Each strategy retrieves as an independent task joined before results
//! are returned; a per-strategy timeout yields a partial result rather
//! than blocking the whole query. Retrieval reads a point-in-time
//! parameter snapshot and never writes shared state, so caller
//! cancellation cannot leave anything partially written.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use plexus_core::config::RetrievalConfig;
use plexus_core::errors::{PlexusResult, RetrievalError};
use plexus_core::traits::{IBridgeIndex, IVectorSearcher};
use plexus_core::types::{
    CandidateTrace, ChunkId, NodeId, ParameterSnapshot, RerankFeatures, RetrievalTrace,
    StrategyId, TraceId,
};

use crate::combiner::{HybridCombiner, StrategyCandidate};
use crate::gating::GatingNetwork;
use crate::graph::GraphStore;

/// One entry of a ranked list returned to the caller.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub chunk_id: ChunkId,
    pub score: f64,
    pub vector_score: f64,
    pub graph_score: f64,
    pub strategy: StrategyId,
}

/// Full result of one retrieval: per-strategy ranked lists, the combined
/// reranked list, and the trace needed for later credit assignment.
#[derive(Debug, Clone)]
pub struct RetrievalOutput {
    pub per_strategy: HashMap<StrategyId, Vec<RankedCandidate>>,
    pub combined: Vec<RankedCandidate>,
    pub trace: RetrievalTrace,
}

pub struct RetrievalEngine {
    vector: Arc<dyn IVectorSearcher>,
    bridge: Arc<dyn IBridgeIndex>,
    graph: Arc<GraphStore>,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(
        vector: Arc<dyn IVectorSearcher>,
        bridge: Arc<dyn IBridgeIndex>,
        graph: Arc<GraphStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            vector,
            bridge,
            graph,
            config,
        }
    }

    /// Run one query against every strategy in parallel and fuse the
    /// results under the given parameter snapshot.
    pub async fn retrieve(
        &self,
        query_embedding: &[f32],
        anchors: &[NodeId],
        domain: &str,
        top_k: usize,
        snapshot: Arc<ParameterSnapshot>,
    ) -> PlexusResult<RetrievalOutput> {
        if query_embedding.is_empty() {
            return Err(RetrievalError::EmptyQueryEmbedding.into());
        }
        for anchor in anchors {
            if !self.graph.contains(anchor) {
                return Err(RetrievalError::UnknownAnchor(anchor.to_string()).into());
            }
        }

        let gating = GatingNetwork::new(&snapshot.gating);
        let distribution = gating.forward(query_embedding);
        let chosen = GatingNetwork::choose(&distribution);
        debug!(?distribution, chosen = %chosen, "gating distribution computed");

        // Fan out: one independent task per strategy. Every strategy races
        // the same deadline, measured from fan-out, so join order does not
        // extend a later strategy's budget.
        let deadline = tokio::time::Instant::now()
            + Duration::from_millis(self.config.strategy_timeout_ms);
        let mut handles = Vec::with_capacity(StrategyId::COUNT);
        for &strategy_id in &StrategyId::ALL {
            let vector = Arc::clone(&self.vector);
            let bridge = Arc::clone(&self.bridge);
            let graph = Arc::clone(&self.graph);
            let snapshot = Arc::clone(&snapshot);
            let config = self.config.clone();
            let embedding = query_embedding.to_vec();
            let anchors = anchors.to_vec();

            let task = tokio::spawn(async move {
                run_strategy(
                    strategy_id,
                    &*vector,
                    &*bridge,
                    &graph,
                    &config,
                    &snapshot,
                    &embedding,
                    &anchors,
                )
            });
            handles.push((strategy_id, task));
        }

        let mut per_strategy_raw: HashMap<StrategyId, Vec<StrategyCandidate>> = HashMap::new();
        let mut timed_out = Vec::new();
        let mut failed = 0usize;

        for (strategy_id, mut task) in handles {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(Ok(candidates))) => {
                    per_strategy_raw.insert(strategy_id, candidates);
                }
                Ok(Ok(Err(e))) => {
                    warn!(strategy = %strategy_id, error = %e, "strategy retrieval failed");
                    failed += 1;
                }
                Ok(Err(join_err)) => {
                    warn!(strategy = %strategy_id, error = %join_err, "strategy task panicked");
                    failed += 1;
                }
                Err(_) => {
                    // Deadline missed: partial result, not a query failure.
                    task.abort();
                    warn!(strategy = %strategy_id, "strategy timed out");
                    timed_out.push(strategy_id);
                }
            }
        }

        if per_strategy_raw.is_empty() {
            // Every strategy failed or timed out; surface it rather than
            // returning an empty success.
            info!(failed, timed_out = timed_out.len(), "retrieval failed on all strategies");
            return Err(RetrievalError::AllStrategiesFailed.into());
        }

        // Combined ranking: rerank every candidate under the snapshot's
        // rerank parameters, best strategy per chunk wins.
        let mut best_per_chunk: HashMap<ChunkId, RankedCandidate> = HashMap::new();
        for (&strategy_id, candidates) in &per_strategy_raw {
            let gating_prob = distribution[strategy_id.index()];
            for c in candidates {
                let features = RerankFeatures {
                    vector_score: c.vector_score,
                    graph_score: c.graph_score,
                    gating_prob,
                    hop_factor: if c.linked {
                        1.0 / (1.0 + c.hops as f64)
                    } else {
                        0.0
                    },
                };
                let score = snapshot.rerank.score(&features);
                let entry = RankedCandidate {
                    chunk_id: c.chunk_id.clone(),
                    score,
                    vector_score: c.vector_score,
                    graph_score: c.graph_score,
                    strategy: strategy_id,
                };
                best_per_chunk
                    .entry(c.chunk_id.clone())
                    .and_modify(|existing| {
                        if score > existing.score {
                            *existing = entry.clone();
                        }
                    })
                    .or_insert(entry);
            }
        }
        let mut combined: Vec<RankedCandidate> = best_per_chunk.into_values().collect();
        combined.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        combined.truncate(top_k);

        // Record the trace: which weights and paths produced each score.
        let candidates_trace: Vec<CandidateTrace> = per_strategy_raw
            .iter()
            .flat_map(|(&strategy_id, candidates)| {
                candidates.iter().map(move |c| CandidateTrace {
                    chunk_id: c.chunk_id.clone(),
                    strategy: strategy_id,
                    vector_score: c.vector_score,
                    graph_score: c.graph_score,
                    path_relations: c.path_relations.clone(),
                    hops: c.hops,
                    bridge_link: c.bridge_link.clone(),
                })
            })
            .collect();

        let trace = RetrievalTrace {
            trace_id: TraceId::new(Uuid::new_v4().to_string()),
            domain: domain.to_string(),
            query_embedding: query_embedding.to_vec(),
            gating_distribution: distribution,
            chosen_strategy: chosen,
            alphas: StrategyId::ALL
                .iter()
                .map(|&s| (s, snapshot.alpha(s, plexus_core::config::defaults::DEFAULT_ALPHA)))
                .collect(),
            candidates: candidates_trace,
            timed_out,
            completed: true,
            created_at: Utc::now(),
        };

        let per_strategy: HashMap<StrategyId, Vec<RankedCandidate>> = per_strategy_raw
            .into_iter()
            .map(|(strategy_id, candidates)| {
                let ranked = candidates
                    .into_iter()
                    .map(|c| RankedCandidate {
                        chunk_id: c.chunk_id,
                        score: c.final_score,
                        vector_score: c.vector_score,
                        graph_score: c.graph_score,
                        strategy: strategy_id,
                    })
                    .collect();
                (strategy_id, ranked)
            })
            .collect();

        info!(
            trace_id = %trace.trace_id,
            combined = combined.len(),
            strategies = per_strategy.len(),
            "retrieval complete"
        );

        Ok(RetrievalOutput {
            per_strategy,
            combined,
            trace,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn run_strategy(
    strategy_id: StrategyId,
    vector: &dyn IVectorSearcher,
    bridge: &dyn IBridgeIndex,
    graph: &GraphStore,
    config: &RetrievalConfig,
    snapshot: &ParameterSnapshot,
    embedding: &[f32],
    anchors: &[NodeId],
) -> PlexusResult<Vec<StrategyCandidate>> {
    let strategy = snapshot
        .strategies
        .get(&strategy_id)
        .cloned()
        .unwrap_or_else(|| plexus_core::priors::default_strategy(strategy_id));
    let alpha = snapshot.alpha(strategy_id, plexus_core::config::defaults::DEFAULT_ALPHA);

    let hits = vector.search(embedding, config.top_n_per_strategy, None)?;
    let combiner = HybridCombiner::new(bridge, graph, config);
    combiner.combine(&hits, anchors, &strategy, alpha)
}
