use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use tracing::debug;

use plexus_core::errors::{BridgeError, PlexusResult};
use plexus_core::traits::IBridgeIndex;
use plexus_core::types::{BridgeLink, BridgeMapping, ChunkId, NodeId, RelationType, Weight};

type MappingKey = (ChunkId, NodeId, RelationType);

#[derive(Debug, Clone)]
struct StoredMapping {
    weight: Weight,
    confidence: Weight,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory bridge index backed by a sharded map. Weight updates go
/// through the map's per-entry locking, so concurrent deltas on the same
/// (chunk, node, relation) key serialize instead of losing writes.
#[derive(Default)]
pub struct BridgeIndex {
    mappings: DashMap<MappingKey, StoredMapping>,
    by_chunk: DashMap<ChunkId, Vec<MappingKey>>,
    by_node: DashMap<NodeId, Vec<MappingKey>>,
    known_chunks: DashSet<ChunkId>,
    known_nodes: DashSet<NodeId>,
}

impl BridgeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chunk id as existing. Mappings may only reference
    /// registered chunks.
    pub fn register_chunk(&self, chunk_id: ChunkId) {
        self.known_chunks.insert(chunk_id);
    }

    /// Register a graph node id as existing.
    pub fn register_node(&self, node_id: NodeId) {
        self.known_nodes.insert(node_id);
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Snapshot of every mapping, for persistence.
    pub fn all_mappings(&self) -> Vec<BridgeMapping> {
        self.mappings
            .iter()
            .map(|entry| {
                let (chunk_id, node_id, relation) = entry.key().clone();
                let stored = entry.value();
                BridgeMapping {
                    chunk_id,
                    node_id,
                    relation,
                    weight: stored.weight,
                    confidence: stored.confidence,
                    created_at: stored.created_at,
                    updated_at: stored.updated_at,
                }
            })
            .collect()
    }

    fn link_from(key: &MappingKey, stored: &StoredMapping) -> BridgeLink {
        BridgeLink {
            chunk_id: key.0.clone(),
            node_id: key.1.clone(),
            relation: key.2,
            weight: stored.weight,
        }
    }
}

impl IBridgeIndex for BridgeIndex {
    fn get_nodes_for_chunk(&self, chunk_id: &ChunkId) -> PlexusResult<Vec<BridgeLink>> {
        if !self.known_chunks.contains(chunk_id) {
            return Err(BridgeError::UnknownChunk(chunk_id.to_string()).into());
        }
        let keys = match self.by_chunk.get(chunk_id) {
            Some(keys) => keys.clone(),
            None => return Ok(Vec::new()),
        };
        let mut links: Vec<BridgeLink> = keys
            .iter()
            .filter_map(|key| {
                self.mappings
                    .get(key)
                    .map(|stored| Self::link_from(key, &stored))
            })
            .collect();
        links.sort_by(|a, b| (&a.node_id, a.relation).cmp(&(&b.node_id, b.relation)));
        Ok(links)
    }

    fn get_chunks_for_node(
        &self,
        node_id: &NodeId,
        relation: Option<RelationType>,
    ) -> PlexusResult<Vec<BridgeLink>> {
        if !self.known_nodes.contains(node_id) {
            return Err(BridgeError::UnknownNode(node_id.to_string()).into());
        }
        let keys = match self.by_node.get(node_id) {
            Some(keys) => keys.clone(),
            None => return Ok(Vec::new()),
        };
        let mut links: Vec<BridgeLink> = keys
            .iter()
            .filter(|key| relation.map_or(true, |r| key.2 == r))
            .filter_map(|key| {
                self.mappings
                    .get(key)
                    .map(|stored| Self::link_from(key, &stored))
            })
            .collect();
        links.sort_by(|a, b| (&a.chunk_id, a.relation).cmp(&(&b.chunk_id, b.relation)));
        Ok(links)
    }

    fn upsert_mapping(&self, mapping: BridgeMapping) -> PlexusResult<()> {
        if !self.known_chunks.contains(&mapping.chunk_id) {
            return Err(BridgeError::UnknownChunk(mapping.chunk_id.to_string()).into());
        }
        if !self.known_nodes.contains(&mapping.node_id) {
            return Err(BridgeError::UnknownNode(mapping.node_id.to_string()).into());
        }

        let key: MappingKey = (
            mapping.chunk_id.clone(),
            mapping.node_id.clone(),
            mapping.relation,
        );

        let mut inserted = false;
        self.mappings
            .entry(key.clone())
            .and_modify(|stored| {
                // Idempotent refresh: structure fields only, the learned
                // weight survives re-ingestion.
                stored.confidence = mapping.confidence;
                stored.updated_at = Utc::now();
            })
            .or_insert_with(|| {
                inserted = true;
                StoredMapping {
                    weight: mapping.weight,
                    confidence: mapping.confidence,
                    version: 0,
                    created_at: mapping.created_at,
                    updated_at: mapping.updated_at,
                }
            });

        if inserted {
            self.by_chunk.entry(key.0.clone()).or_default().push(key.clone());
            self.by_node.entry(key.1.clone()).or_default().push(key.clone());
            debug!(chunk = %key.0, node = %key.1, relation = %key.2, "bridge mapping created");
        }
        Ok(())
    }

    fn update_weight(
        &self,
        chunk_id: &ChunkId,
        node_id: &NodeId,
        relation: RelationType,
        delta: f64,
    ) -> PlexusResult<Weight> {
        let key: MappingKey = (chunk_id.clone(), node_id.clone(), relation);
        let mut stored = self.mappings.get_mut(&key).ok_or_else(|| {
            BridgeError::MappingNotFound {
                chunk_id: chunk_id.to_string(),
                node_id: node_id.to_string(),
                relation: relation.to_string(),
            }
        })?;

        // Zero delta is a no-op: no version bump, no timestamp touch.
        if delta == 0.0 {
            return Ok(stored.weight);
        }

        stored.weight = stored.weight.apply_delta(delta);
        stored.version += 1;
        stored.updated_at = Utc::now();
        debug!(
            chunk = %chunk_id, node = %node_id, relation = %relation,
            delta, weight = %stored.weight, "bridge weight updated"
        );
        Ok(stored.weight)
    }
}
