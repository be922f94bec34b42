//! # plexus-core
//!
//! Foundation crate for the Plexus hybrid retrieval-and-learning system.
//! Defines all types, traits, errors, config, and priors.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod feedback;
pub mod priors;
pub mod traits;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::PlexusConfig;
pub use errors::{PlexusError, PlexusResult};
pub use types::{
    ChunkId, FeedbackLevel, NodeId, RelationType, StrategyId, TraceId, UserId, Weight,
};
