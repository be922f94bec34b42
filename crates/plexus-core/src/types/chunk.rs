use serde::{Deserialize, Serialize};

use super::ids::ChunkId;

/// Content-type tag assigned to a chunk by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Definition,
    Narrative,
    Procedure,
    Reference,
}

/// A content chunk with its embedding. Immutable; produced externally by
/// the ingestion pipeline. This core never mutates chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub embedding: Vec<f32>,
    pub content_type: ContentType,
}

impl Chunk {
    pub fn new(id: impl Into<ChunkId>, embedding: Vec<f32>, content_type: ContentType) -> Self {
        Self {
            id: id.into(),
            embedding,
            content_type,
        }
    }
}
