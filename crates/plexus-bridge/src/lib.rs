//! # plexus-bridge
//!
//! The Bridge Index: a persistent many-to-many mapping between content
//! chunks and graph nodes, each link carrying a mutable learned weight.
//! The weight is the only field the learning core owns; link structure is
//! seeded by ingestion.

mod index;

pub use index::BridgeIndex;
