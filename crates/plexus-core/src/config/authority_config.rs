use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::{PlexusError, PlexusResult};

/// Multilevel authority calculator configuration.
///
/// `authority = baseline_share * credential + track_record_share * track_record
///             + recent_share * recent_performance`, shares summing to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    pub baseline_share: f64,
    pub track_record_share: f64,
    pub recent_share: f64,
    /// Neutral authority for users with no history.
    pub prior: f64,
    /// Number of most-recent outcomes considered for recent performance.
    pub recent_window: usize,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            baseline_share: defaults::DEFAULT_AUTHORITY_BASELINE_SHARE,
            track_record_share: defaults::DEFAULT_AUTHORITY_TRACK_RECORD_SHARE,
            recent_share: defaults::DEFAULT_AUTHORITY_RECENT_SHARE,
            prior: defaults::DEFAULT_AUTHORITY_PRIOR,
            recent_window: defaults::DEFAULT_RECENT_WINDOW,
        }
    }
}

impl AuthorityConfig {
    pub fn validate(&self) -> PlexusResult<()> {
        let sum = self.baseline_share + self.track_record_share + self.recent_share;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(PlexusError::InvalidConfig(format!(
                "authority shares must sum to 1, got {sum}"
            )));
        }
        if !(0.0..=1.0).contains(&self.prior) {
            return Err(PlexusError::InvalidConfig(format!(
                "authority prior must be in [0,1], got {}",
                self.prior
            )));
        }
        if self.recent_window == 0 {
            return Err(PlexusError::InvalidConfig(
                "recent_window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
