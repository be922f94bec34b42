//! # plexus-engine
//!
//! The facade crate: wires the vector index, bridge, graph, retrieval,
//! learning, authority, decay, and persistence into one engine with a
//! small surface. Content and graph structure are loaded through the
//! builder; queries and feedback flow through [`Plexus`].

mod builder;
mod facade;

pub use builder::PlexusBuilder;
pub use facade::Plexus;

pub use plexus_retrieval::{RankedCandidate, RetrievalOutput};
