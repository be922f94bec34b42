use serde::{Deserialize, Serialize};

use super::strategy::{RelationType, StrategyId};
use super::weight::Weight;

/// Key addressing one logical learnable parameter. Each key is updated
/// under single-writer discipline in the parameter store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    /// One per-strategy per-relation traversal weight.
    Traversal(StrategyId, RelationType),
    /// The per-strategy vector/graph mixing coefficient.
    Alpha(StrategyId),
    /// One strategy's gating logit row (weights + bias).
    GatingRow(StrategyId),
    /// The rerank feature-weight block.
    Rerank,
}

impl std::fmt::Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKey::Traversal(s, r) => write!(f, "traversal/{s}/{r}"),
            ParamKey::Alpha(s) => write!(f, "alpha/{s}"),
            ParamKey::GatingRow(s) => write!(f, "gating/{s}"),
            ParamKey::Rerank => write!(f, "rerank"),
        }
    }
}

/// Per-strategy scalar in [0,1] blending vector score against graph score:
/// `final = alpha * vector + (1 - alpha) * graph`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaParameter {
    pub strategy: StrategyId,
    pub value: Weight,
}

/// Gating network parameters: one logit row (linear weights + bias) per
/// strategy over the query embedding. The forward pass is linear + softmax,
/// so the output is a valid probability distribution by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatingParameters {
    /// `rows[strategy_index]` is that strategy's logit weights over the
    /// embedding dimensions.
    pub rows: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub embedding_dim: usize,
}

impl GatingParameters {
    /// Zero-initialized gating: every query maps to the uniform
    /// distribution until feedback differentiates the strategies.
    pub fn uniform(embedding_dim: usize) -> Self {
        Self {
            rows: vec![vec![0.0; embedding_dim]; StrategyId::COUNT],
            bias: vec![0.0; StrategyId::COUNT],
            embedding_dim,
        }
    }

    /// Logit for one strategy. Dot product runs over the shorter of the
    /// row and the input so a dimension mismatch degrades instead of
    /// panicking.
    pub fn logit(&self, strategy: StrategyId, embedding: &[f32]) -> f64 {
        let row = &self.rows[strategy.index()];
        let dot: f64 = row
            .iter()
            .zip(embedding.iter())
            .map(|(w, x)| w * *x as f64)
            .sum();
        dot + self.bias[strategy.index()]
    }
}

/// Candidate features consumed by the reranker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankFeatures {
    pub vector_score: f64,
    pub graph_score: f64,
    /// Gating probability of the strategy that produced the candidate.
    pub gating_prob: f64,
    /// 1 / (1 + hops) of the best graph path, 0.0 when unlinked.
    pub hop_factor: f64,
}

impl RerankFeatures {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.vector_score,
            self.graph_score,
            self.gating_prob,
            self.hop_factor,
        ]
    }
}

/// Rerank parameters: linear weights over `RerankFeatures`, producing the
/// scalar ordering score for the combined ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankParameters {
    pub weights: [f64; 4],
}

impl RerankParameters {
    pub fn score(&self, features: &RerankFeatures) -> f64 {
        self.weights
            .iter()
            .zip(features.as_array().iter())
            .map(|(w, f)| w * f)
            .sum()
    }
}

impl Default for RerankParameters {
    fn default() -> Self {
        // Vector and graph evidence dominate; gating and path proximity
        // act as tie-breakers.
        Self {
            weights: [0.4, 0.3, 0.2, 0.1],
        }
    }
}

/// Point-in-time copy of every learnable parameter. Retrieval reads one of
/// these and never touches shared state, so an in-flight update is never
/// fatal to a concurrent query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub strategies: std::collections::HashMap<StrategyId, super::strategy::Strategy>,
    pub alphas: std::collections::HashMap<StrategyId, Weight>,
    pub gating: GatingParameters,
    pub rerank: RerankParameters,
    /// Monotonic store version this snapshot was taken at.
    pub version: u64,
    pub taken_at: chrono::DateTime<chrono::Utc>,
}

/// One applied parameter mutation. The change log is append-only and
/// versioned: parameters are never hard-deleted, so any state can be
/// rolled back by replaying the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterChange {
    pub seq: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Feedback event that triggered the change; `None` for decay sweeps.
    pub feedback_id: Option<super::ids::FeedbackId>,
    pub key: ParamKey,
    pub old_value: serde_json::Value,
    pub new_value: serde_json::Value,
}

impl ParameterSnapshot {
    /// Alpha for a strategy, falling back to the configured default prior.
    pub fn alpha(&self, strategy: StrategyId, default_alpha: f64) -> f64 {
        self.alphas
            .get(&strategy)
            .map(|w| w.value())
            .unwrap_or(default_alpha)
    }
}
