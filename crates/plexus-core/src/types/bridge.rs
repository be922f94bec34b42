use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ChunkId, NodeId};
use super::strategy::RelationType;
use super::weight::Weight;

/// A weighted many-to-many link between a content chunk and a graph node.
/// The link structure is seeded by ingestion; `weight` is the only field
/// this core owns and mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeMapping {
    pub chunk_id: ChunkId,
    pub node_id: NodeId,
    pub relation: RelationType,
    pub weight: Weight,
    pub confidence: Weight,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BridgeMapping {
    pub fn new(
        chunk_id: impl Into<ChunkId>,
        node_id: impl Into<NodeId>,
        relation: RelationType,
        weight: Weight,
        confidence: Weight,
    ) -> Self {
        let now = Utc::now();
        Self {
            chunk_id: chunk_id.into(),
            node_id: node_id.into(),
            relation,
            weight,
            confidence,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A resolved bridge link as returned by index lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeLink {
    pub chunk_id: ChunkId,
    pub node_id: NodeId,
    pub relation: RelationType,
    pub weight: Weight,
}
