//! Trait seams between subsystems. Retrieval consumes the bridge and the
//! vector index through these, so either can be swapped (in-memory for
//! tests, persistent in production).

mod bridge;
mod vector;

pub use bridge::IBridgeIndex;
pub use vector::{IVectorSearcher, VectorHit};
