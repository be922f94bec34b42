//! # plexus-learning
//!
//! The write path: converts authority-weighted community feedback into
//! parameter updates. One feedback event is validated at the boundary,
//! decomposed into per-layer rewards, weighted by the provider's
//! authority, and applied as policy-gradient updates to the traversal,
//! gating, alpha, and rerank parameters touched by the execution trace.

pub mod baseline;
pub mod engine;
pub mod reward;
pub mod store;
pub mod updater;

pub use baseline::BaselineTracker;
pub use engine::{FeedbackAck, LearningEngine};
pub use reward::LayerRewards;
pub use store::ParameterStore;
pub use updater::{PartialApply, PolicyGradientUpdater};
