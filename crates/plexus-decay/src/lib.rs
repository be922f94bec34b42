//! # plexus-decay
//!
//! Temporal decay for traversal weights. A weight that keeps receiving
//! feedback keeps its learned value; one that goes unreinforced drifts
//! back toward its prior at a per-day rate. Alpha, gating, and rerank
//! parameters do not decay.

pub mod formula;
pub mod manager;
pub mod sweeper;

pub use manager::{DecayManager, SweepReport};
pub use sweeper::DecaySweeper;
