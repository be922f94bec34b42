//! Sweep logic: walk every traversal weight, skip the recently
//! reinforced, blend the rest toward their priors.

use std::cell::Cell;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use plexus_core::config::DecayConfig;
use plexus_core::errors::PlexusResult;
use plexus_core::priors;
use plexus_core::types::{ParamKey, RelationType, StrategyId, Weight};
use plexus_learning::store::{ParamValue, ParameterStore};

const SECS_PER_DAY: f64 = 86_400.0;

/// Outcome of one decay sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Traversal weights examined.
    pub examined: usize,
    /// Weights moved toward their prior.
    pub decayed: usize,
    /// Weights inside the freshness window, left alone.
    pub fresh: usize,
    /// Weights already at their prior.
    pub settled: usize,
}

pub struct DecayManager {
    store: Arc<ParameterStore>,
    config: DecayConfig,
}

impl DecayManager {
    pub fn new(store: Arc<ParameterStore>, config: DecayConfig) -> Self {
        Self { store, config }
    }

    /// Run one sweep as of `now`. Decay entries carry no feedback id in
    /// the change log, distinguishing them from learning updates.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> PlexusResult<SweepReport> {
        let ages = self.store.traversal_ages();
        let examined = ages.len();

        // Parallel prefilter over a snapshot of the update times. The
        // decision that counts is re-made per key under the entry lock in
        // apply_decay, so a reinforcement landing after this scan keeps
        // its value.
        let stale: Vec<_> = ages
            .par_iter()
            .filter(|&&(_, _, _, updated_at)| self.is_stale(updated_at, now))
            .map(|&(strategy, relation, _, _)| (strategy, relation))
            .collect();
        let fresh_at_scan = examined - stale.len();

        let (decayed, fresh, settled) = self.apply_decay(&stale, now)?;

        let report = SweepReport {
            examined,
            decayed,
            fresh: fresh_at_scan + fresh,
            settled,
        };
        info!(
            examined = report.examined,
            decayed = report.decayed,
            fresh = report.fresh,
            "decay sweep finished"
        );
        Ok(report)
    }

    fn is_stale(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let days = (now - updated_at).num_seconds() as f64 / SECS_PER_DAY;
        days > self.config.freshness_window_days as f64
    }

    /// Decay the given keys, recomputing each blend from the entry's
    /// current value and re-checking freshness under its lock. Returns
    /// (decayed, fresh, settled) counts.
    fn apply_decay(
        &self,
        keys: &[(StrategyId, RelationType)],
        now: DateTime<Utc>,
    ) -> PlexusResult<(usize, usize, usize)> {
        let mut decayed = 0usize;
        let mut fresh = 0usize;
        let mut settled = 0usize;

        for &(strategy, relation) in keys {
            let prior = priors::prior_for(strategy, relation).value();
            let reinforced = Cell::new(false);
            let result = self.store.mutate_timed(
                ParamKey::Traversal(strategy, relation),
                None,
                |value, updated_at| {
                    if !self.is_stale(updated_at, now) {
                        reinforced.set(true);
                        return None;
                    }
                    let ParamValue::Scalar(w) = value else {
                        return None;
                    };
                    let days = (now - updated_at).num_seconds() as f64 / SECS_PER_DAY;
                    let new = formula_clamped(w.value(), prior, days, self.config.decay_rate);
                    if (new - w.value()).abs() < 1e-9 {
                        return None;
                    }
                    Some(ParamValue::Scalar(Weight::new(new)))
                },
            )?;
            match result {
                Some(_) => {
                    debug!(%strategy, %relation, "traversal weight decayed");
                    decayed += 1;
                }
                None if reinforced.get() => fresh += 1,
                None => settled += 1,
            }
        }
        Ok((decayed, fresh, settled))
    }

    /// Run one sweep against the current clock.
    pub fn sweep(&self) -> PlexusResult<SweepReport> {
        self.sweep_at(Utc::now())
    }
}

fn formula_clamped(old: f64, prior: f64, days: f64, rate: f64) -> f64 {
    crate::formula::decay_toward_prior(old, prior, days, rate)
        .clamp(Weight::TRAVERSAL_FLOOR, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use plexus_core::config::LearningConfig;
    use plexus_core::types::{RelationType, StrategyId};

    fn manager() -> DecayManager {
        let store = Arc::new(ParameterStore::from_priors(
            4,
            &LearningConfig::default(),
        ));
        DecayManager::new(store, DecayConfig::default())
    }

    #[test]
    fn fresh_weights_are_untouched() {
        let manager = manager();
        let report = manager.sweep().unwrap();
        assert_eq!(report.decayed, 0);
        assert_eq!(report.fresh, report.examined);
    }

    #[test]
    fn stale_weights_move_toward_prior() {
        let manager = manager();
        let strategy = StrategyId::Semantic;
        let relation = RelationType::Defines;
        let prior = priors::prior_for(strategy, relation).value();

        // Reinforced to 1.0 a hundred days ago, never since.
        let then = Utc::now() - Duration::days(100);
        manager
            .store
            .restore_traversal(strategy, relation, Weight::new(1.0), then);

        let report = manager.sweep().unwrap();
        assert!(report.decayed >= 1);

        let now_value = manager
            .store
            .scalar(ParamKey::Traversal(strategy, relation))
            .unwrap()
            .value();
        assert!(now_value < 1.0);
        assert!(now_value > prior);
    }

    #[test]
    fn reinforcement_after_planning_is_not_overwritten() {
        let manager = manager();
        let strategy = StrategyId::Semantic;
        let relation = RelationType::Defines;
        let key = ParamKey::Traversal(strategy, relation);
        let now = Utc::now();

        // Stale when the sweep scans.
        manager.store.restore_traversal(
            strategy,
            relation,
            Weight::new(1.0),
            now - Duration::days(100),
        );
        let planned = vec![(strategy, relation)];

        // A feedback update lands before the plan is applied.
        manager
            .store
            .mutate(key, None, |_| ParamValue::Scalar(Weight::new(0.42)))
            .unwrap();

        let (decayed, fresh, settled) = manager.apply_decay(&planned, now).unwrap();
        assert_eq!((decayed, fresh, settled), (0, 1, 0));
        let w = manager.store.scalar(key).unwrap().value();
        assert!((w - 0.42).abs() < 1e-12);
    }

    #[test]
    fn weight_at_prior_is_settled_not_rewritten() {
        let manager = manager();
        let strategy = StrategyId::Causal;
        let relation = RelationType::Causes;
        let prior = priors::prior_for(strategy, relation);
        let then = Utc::now() - Duration::days(30);
        manager
            .store
            .restore_traversal(strategy, relation, prior, then);

        let version_before = manager.store.snapshot().version;
        manager.sweep().unwrap();
        // Only genuinely moved weights bump the store version.
        let log = manager.store.drain_log();
        assert!(log
            .iter()
            .all(|c| c.key != ParamKey::Traversal(strategy, relation)));
        assert_eq!(manager.store.snapshot().version, version_before);
    }

    #[test]
    fn decay_log_entries_carry_no_feedback_id() {
        let manager = manager();
        let then = Utc::now() - Duration::days(60);
        manager.store.restore_traversal(
            StrategyId::Semantic,
            RelationType::References,
            Weight::new(0.95),
            then,
        );
        manager.sweep().unwrap();
        let log = manager.store.drain_log();
        assert!(!log.is_empty());
        assert!(log.iter().all(|c| c.feedback_id.is_none()));
    }
}
