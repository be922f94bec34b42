use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::{PlexusError, PlexusResult};

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum hop count for graph path scoring.
    pub hop_limit: usize,
    /// Per-strategy deadline in milliseconds. A strategy missing it yields
    /// a partial result rather than blocking the whole query.
    pub strategy_timeout_ms: u64,
    /// Neutral graph score for chunks with no bridge links.
    pub unlinked_graph_score: f64,
    /// Candidates fetched per strategy before hybrid combination.
    pub top_n_per_strategy: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            hop_limit: defaults::DEFAULT_HOP_LIMIT,
            strategy_timeout_ms: defaults::DEFAULT_STRATEGY_TIMEOUT_MS,
            unlinked_graph_score: defaults::DEFAULT_UNLINKED_GRAPH_SCORE,
            top_n_per_strategy: defaults::DEFAULT_TOP_N_PER_STRATEGY,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> PlexusResult<()> {
        if !(0.0..=1.0).contains(&self.unlinked_graph_score) {
            return Err(PlexusError::InvalidConfig(format!(
                "unlinked_graph_score must be in [0,1], got {}",
                self.unlinked_graph_score
            )));
        }
        if self.hop_limit == 0 {
            return Err(PlexusError::InvalidConfig(
                "hop_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
