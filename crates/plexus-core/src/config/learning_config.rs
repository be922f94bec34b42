use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::{PlexusError, PlexusResult};

/// Policy-gradient updater configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Step size for every parameter update.
    pub learning_rate: f64,
    /// EMA smoothing for the per-level reward baseline. Higher values
    /// remember more history.
    pub baseline_smoothing: f64,
    /// Credit multiplier per retrieval iteration back from the final one.
    pub iteration_credit_decay: f64,
    /// Bounded retries before a conflicting update is surfaced.
    pub update_max_retries: u32,
    /// Base backoff between retries (milliseconds).
    pub update_retry_backoff_ms: u64,
    /// Upper bound on retrieval traces retained while awaiting feedback.
    /// The oldest traces are evicted first.
    pub max_pending_traces: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            baseline_smoothing: defaults::DEFAULT_BASELINE_SMOOTHING,
            iteration_credit_decay: defaults::DEFAULT_ITERATION_CREDIT_DECAY,
            update_max_retries: defaults::DEFAULT_UPDATE_MAX_RETRIES,
            update_retry_backoff_ms: defaults::DEFAULT_UPDATE_RETRY_BACKOFF_MS,
            max_pending_traces: defaults::DEFAULT_MAX_PENDING_TRACES,
        }
    }
}

impl LearningConfig {
    pub fn validate(&self) -> PlexusResult<()> {
        if self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(PlexusError::InvalidConfig(format!(
                "learning_rate must be in (0,1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.baseline_smoothing) {
            return Err(PlexusError::InvalidConfig(format!(
                "baseline_smoothing must be in [0,1), got {}",
                self.baseline_smoothing
            )));
        }
        if !(0.0..=1.0).contains(&self.iteration_credit_decay) {
            return Err(PlexusError::InvalidConfig(format!(
                "iteration_credit_decay must be in [0,1], got {}",
                self.iteration_credit_decay
            )));
        }
        if self.max_pending_traces == 0 {
            return Err(PlexusError::InvalidConfig(
                "max_pending_traces must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
