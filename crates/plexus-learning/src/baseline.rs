//! Per-level moving-average reward baseline for variance reduction.
//!
//! The policy-gradient advantage is `reward - baseline(level)` where the
//! baseline is an exponential moving average of recent rewards at that
//! level, seeded at the neutral 0.5.

use dashmap::DashMap;

use plexus_core::types::{FeedbackLevel, Weight};

pub struct BaselineTracker {
    baselines: DashMap<FeedbackLevel, f64>,
    smoothing: f64,
}

impl BaselineTracker {
    pub fn new(smoothing: f64) -> Self {
        let baselines = DashMap::new();
        for level in FeedbackLevel::ALL {
            baselines.insert(level, Weight::NEUTRAL);
        }
        Self {
            baselines,
            smoothing,
        }
    }

    /// Current baseline for a level.
    pub fn baseline(&self, level: FeedbackLevel) -> f64 {
        self.baselines
            .get(&level)
            .map(|b| *b)
            .unwrap_or(Weight::NEUTRAL)
    }

    /// Advantage of a reward over the current baseline.
    pub fn advantage(&self, level: FeedbackLevel, reward: f64) -> f64 {
        reward - self.baseline(level)
    }

    /// Fold a new reward into the moving average.
    pub fn observe(&self, level: FeedbackLevel, reward: f64) {
        let mut entry = self
            .baselines
            .entry(level)
            .or_insert(Weight::NEUTRAL);
        *entry = self.smoothing * *entry + (1.0 - self.smoothing) * reward;
    }
}
