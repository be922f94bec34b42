use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChunkId, NodeId, TraceId};
use super::strategy::{RelationType, StrategyId};

/// Per-candidate record of which evidence produced its score. Needed for
/// credit assignment when feedback arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrace {
    pub chunk_id: ChunkId,
    pub strategy: StrategyId,
    pub vector_score: f64,
    pub graph_score: f64,
    /// Relations traversed on the winning graph path, empty when the
    /// chunk had no bridge links.
    pub path_relations: Vec<RelationType>,
    pub hops: usize,
    /// The bridge link that carried the graph evidence, if any.
    pub bridge_link: Option<(NodeId, RelationType)>,
}

/// Record of one retrieval execution: which strategies ran, the gating
/// distribution they were weighted by, and the evidence behind every
/// returned candidate. A FeedbackEvent must reference a completed trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalTrace {
    pub trace_id: TraceId,
    pub domain: String,
    pub query_embedding: Vec<f32>,
    /// Gating distribution at retrieval time, indexed like `StrategyId::ALL`.
    pub gating_distribution: Vec<f64>,
    /// Strategy the gating network favored for this query.
    pub chosen_strategy: StrategyId,
    /// Per-strategy alpha values in effect during this retrieval.
    pub alphas: Vec<(StrategyId, f64)>,
    pub candidates: Vec<CandidateTrace>,
    /// Strategies that timed out and contributed no candidates.
    pub timed_out: Vec<StrategyId>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}
