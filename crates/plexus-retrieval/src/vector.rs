//! Brute-force in-memory nearest-neighbor index over chunk embeddings.
//!
//! Cosine similarity normalized to [0,1] via `(cos + 1) / 2`. Deterministic
//! for a fixed index state: ties break by chunk id.

use plexus_core::errors::{PlexusResult, RetrievalError};
use plexus_core::traits::{IVectorSearcher, VectorHit};
use plexus_core::types::{Chunk, ChunkId, ContentType};

struct IndexedChunk {
    id: ChunkId,
    embedding: Vec<f32>,
    norm: f64,
    content_type: ContentType,
}

/// In-memory vector index. Insert order does not affect results.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    entries: Vec<IndexedChunk>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chunk: &Chunk) {
        let norm = l2_norm(&chunk.embedding);
        // Replace on re-ingestion of the same chunk id.
        self.entries.retain(|e| e.id != chunk.id);
        self.entries.push(IndexedChunk {
            id: chunk.id.clone(),
            embedding: chunk.embedding.clone(),
            norm,
            content_type: chunk.content_type,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt()
}

fn cosine(a: &[f32], a_norm: f64, b: &[f32], b_norm: f64) -> f64 {
    if a_norm < f64::EPSILON || b_norm < f64::EPSILON {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    dot / (a_norm * b_norm)
}

impl IVectorSearcher for InMemoryVectorIndex {
    fn search(
        &self,
        embedding: &[f32],
        top_n: usize,
        filter: Option<ContentType>,
    ) -> PlexusResult<Vec<VectorHit>> {
        if embedding.is_empty() {
            return Err(RetrievalError::EmptyQueryEmbedding.into());
        }
        let query_norm = l2_norm(embedding);

        let mut hits: Vec<VectorHit> = self
            .entries
            .iter()
            .filter(|e| filter.map_or(true, |f| e.content_type == f))
            .map(|e| VectorHit {
                chunk_id: e.id.clone(),
                // Map cosine [-1,1] into [0,1].
                similarity: (cosine(embedding, query_norm, &e.embedding, e.norm) + 1.0) / 2.0,
                content_type: e.content_type,
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(top_n);
        Ok(hits)
    }
}
