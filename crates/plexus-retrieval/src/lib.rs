//! # plexus-retrieval
//!
//! The read path: vector similarity search, per-strategy weighted graph
//! traversal scoring, hybrid combination, and the gating network that
//! distributes a query across the fixed strategy set.
//!
//! Retrieval is read-mostly and embarrassingly parallel across strategies:
//! each strategy runs as an independent task against a point-in-time
//! parameter snapshot and never writes shared state.

pub mod combiner;
pub mod engine;
pub mod gating;
pub mod graph;
pub mod vector;

pub use combiner::{HybridCombiner, StrategyCandidate};
pub use engine::{RankedCandidate, RetrievalEngine, RetrievalOutput};
pub use gating::GatingNetwork;
pub use graph::{GraphStore, PathScore};
pub use vector::InMemoryVectorIndex;
