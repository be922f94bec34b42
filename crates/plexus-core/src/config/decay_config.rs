use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::{PlexusError, PlexusResult};

/// Temporal decay configuration. Decay applies to traversal weights only;
/// alpha and gating are stable without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Per-day retention factor. The sweep computes
    /// `decay_rate^days * old + (1 - decay_rate^days) * prior`.
    pub decay_rate: f64,
    /// Weights reinforced within this many days are left alone.
    pub freshness_window_days: i64,
    /// Interval between sweeps (seconds).
    pub sweep_interval_secs: u64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_rate: defaults::DEFAULT_DECAY_RATE,
            freshness_window_days: defaults::DEFAULT_FRESHNESS_WINDOW_DAYS,
            sweep_interval_secs: defaults::DEFAULT_DECAY_SWEEP_INTERVAL_SECS,
        }
    }
}

impl DecayConfig {
    pub fn validate(&self) -> PlexusResult<()> {
        if !(0.0..1.0).contains(&self.decay_rate) {
            return Err(PlexusError::InvalidConfig(format!(
                "decay_rate must be in [0,1), got {}",
                self.decay_rate
            )));
        }
        if self.freshness_window_days < 0 {
            return Err(PlexusError::InvalidConfig(
                "freshness_window_days must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
