use crate::errors::PlexusResult;
use crate::types::{BridgeLink, BridgeMapping, ChunkId, NodeId, RelationType, Weight};

/// The chunk <-> node bridge: many-to-many weighted links.
///
/// Link structure is created externally; `update_weight` is the only
/// mutation the learning core performs. Implementations serialize
/// concurrent weight updates per (chunk, node, relation) key.
pub trait IBridgeIndex: Send + Sync {
    /// All links from a chunk to graph nodes.
    fn get_nodes_for_chunk(&self, chunk_id: &ChunkId) -> PlexusResult<Vec<BridgeLink>>;

    /// All links from a node to chunks, optionally filtered by relation.
    fn get_chunks_for_node(
        &self,
        node_id: &NodeId,
        relation: Option<RelationType>,
    ) -> PlexusResult<Vec<BridgeLink>>;

    /// Create or refresh a mapping. Idempotent on (chunk, node, relation).
    /// Fails when the referenced chunk or node is unknown.
    fn upsert_mapping(&self, mapping: BridgeMapping) -> PlexusResult<()>;

    /// Apply a signed delta to a mapping's weight, clamped to [0,1].
    /// Fails on a missing mapping; never creates one. Returns the new
    /// weight.
    fn update_weight(
        &self,
        chunk_id: &ChunkId,
        node_id: &NodeId,
        relation: RelationType,
        delta: f64,
    ) -> PlexusResult<Weight>;
}
