//! Core data model: identifiers, weights, content, graph, bridge, strategies,
//! and learnable parameters.

mod bridge;
mod chunk;
mod graph;
mod ids;
mod params;
mod strategy;
mod trace;
mod weight;

pub use bridge::{BridgeLink, BridgeMapping};
pub use chunk::{Chunk, ContentType};
pub use graph::{GraphEdge, GraphNode, NodeType};
pub use ids::{ChunkId, FeedbackId, NodeId, TraceId, UserId};
pub use params::{
    AlphaParameter, GatingParameters, ParamKey, ParameterChange, ParameterSnapshot,
    RerankFeatures, RerankParameters,
};
pub use strategy::{RelationType, Strategy, StrategyId};
pub use trace::{CandidateTrace, RetrievalTrace};
pub use weight::Weight;

use serde::{Deserialize, Serialize};

/// The three feedback layers credit is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    Retrieval,
    Reasoning,
    Synthesis,
}

impl FeedbackLevel {
    pub const ALL: [FeedbackLevel; 3] = [
        FeedbackLevel::Retrieval,
        FeedbackLevel::Reasoning,
        FeedbackLevel::Synthesis,
    ];
}

impl std::fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackLevel::Retrieval => write!(f, "retrieval"),
            FeedbackLevel::Reasoning => write!(f, "reasoning"),
            FeedbackLevel::Synthesis => write!(f, "synthesis"),
        }
    }
}
