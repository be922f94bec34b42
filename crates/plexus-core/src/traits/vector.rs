use serde::{Deserialize, Serialize};

use crate::errors::PlexusResult;
use crate::types::{ChunkId, ContentType};

/// One nearest-neighbor hit. Similarity is normalized to [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    pub chunk_id: ChunkId,
    pub similarity: f64,
    pub content_type: ContentType,
}

/// Nearest-neighbor search over chunk embeddings.
///
/// Implementations must be deterministic for a fixed index state: equal
/// similarities break ties by chunk id.
pub trait IVectorSearcher: Send + Sync {
    fn search(
        &self,
        embedding: &[f32],
        top_n: usize,
        filter: Option<ContentType>,
    ) -> PlexusResult<Vec<VectorHit>>;
}
