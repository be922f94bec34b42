//! Keyed parameter store: the single writer path for every learnable
//! parameter.
//!
//! Each logical parameter key maps to one versioned entry in a sharded
//! map. Mutations take the entry's lock with bounded retries and backoff;
//! a conflicting update is retried, never silently dropped. Readers take
//! point-in-time snapshots and never block writers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::try_result::TryResult;
use dashmap::DashMap;
use tracing::debug;

use plexus_core::config::LearningConfig;
use plexus_core::errors::{LearningError, PlexusResult};
use plexus_core::priors;
use plexus_core::types::{
    FeedbackId, GatingParameters, ParamKey, ParameterChange, ParameterSnapshot, RelationType,
    RerankParameters, StrategyId, Weight,
};

/// The value held at one parameter key.
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// Traversal weight or alpha.
    Scalar(Weight),
    /// One strategy's gating logit row.
    GatingRow { weights: Vec<f64>, bias: f64 },
    /// The rerank feature-weight block.
    Rerank([f64; 4]),
}

impl ParamValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Scalar(w) => serde_json::json!(w.value()),
            ParamValue::GatingRow { weights, bias } => {
                serde_json::json!({ "weights": weights, "bias": bias })
            }
            ParamValue::Rerank(w) => serde_json::json!(w.to_vec()),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: ParamValue,
    version: u64,
    updated_at: DateTime<Utc>,
}

/// Sharded, versioned parameter store.
pub struct ParameterStore {
    params: DashMap<ParamKey, Entry>,
    embedding_dim: usize,
    /// Monotonic store version, bumped once per applied mutation.
    version: AtomicU64,
    /// Append-only change log, drained periodically for persistence.
    log: Mutex<Vec<ParameterChange>>,
    seq: AtomicU64,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ParameterStore {
    /// Initialize every parameter from its prior.
    pub fn from_priors(embedding_dim: usize, config: &LearningConfig) -> Self {
        let params = DashMap::new();
        let now = Utc::now();

        for &strategy in &StrategyId::ALL {
            for relation in priors::allowed_relations(strategy) {
                params.insert(
                    ParamKey::Traversal(strategy, relation),
                    Entry {
                        value: ParamValue::Scalar(priors::prior_for(strategy, relation)),
                        version: 0,
                        updated_at: now,
                    },
                );
            }
            params.insert(
                ParamKey::Alpha(strategy),
                Entry {
                    value: ParamValue::Scalar(Weight::new(
                        plexus_core::config::defaults::DEFAULT_ALPHA,
                    )),
                    version: 0,
                    updated_at: now,
                },
            );
            params.insert(
                ParamKey::GatingRow(strategy),
                Entry {
                    value: ParamValue::GatingRow {
                        weights: vec![0.0; embedding_dim],
                        bias: 0.0,
                    },
                    version: 0,
                    updated_at: now,
                },
            );
        }
        params.insert(
            ParamKey::Rerank,
            Entry {
                value: ParamValue::Rerank(RerankParameters::default().weights),
                version: 0,
                updated_at: now,
            },
        );

        Self {
            params,
            embedding_dim,
            version: AtomicU64::new(0),
            log: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
            max_retries: config.update_max_retries,
            retry_backoff: Duration::from_millis(config.update_retry_backoff_ms),
        }
    }

    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Mutate one parameter under its entry lock. The closure sees the
    /// current value and returns the new one; bounded retries with
    /// backoff when the entry is locked by another writer.
    pub fn mutate<F>(
        &self,
        key: ParamKey,
        feedback_id: Option<&FeedbackId>,
        f: F,
    ) -> PlexusResult<ParamValue>
    where
        F: Fn(&ParamValue) -> ParamValue,
    {
        let mut entry = self.entry_mut(&key)?;
        let old = entry.value.clone();
        let new = f(&old);
        entry.value = new.clone();
        entry.version += 1;
        entry.updated_at = Utc::now();
        drop(entry);

        self.version.fetch_add(1, Ordering::SeqCst);
        self.append_log(key, feedback_id, &old, &new);
        Ok(new)
    }

    /// Like [`ParameterStore::mutate`], but the closure also sees the
    /// entry's last-update time and may decline the write by returning
    /// `None`. A declined write bumps no version and logs nothing. The
    /// decay sweep re-checks freshness through this, under the entry
    /// lock, so a reinforcement that landed after the sweep planned its
    /// work keeps its value.
    pub fn mutate_timed<F>(
        &self,
        key: ParamKey,
        feedback_id: Option<&FeedbackId>,
        f: F,
    ) -> PlexusResult<Option<ParamValue>>
    where
        F: Fn(&ParamValue, DateTime<Utc>) -> Option<ParamValue>,
    {
        let mut entry = self.entry_mut(&key)?;
        let old = entry.value.clone();
        let Some(new) = f(&old, entry.updated_at) else {
            return Ok(None);
        };
        entry.value = new.clone();
        entry.version += 1;
        entry.updated_at = Utc::now();
        drop(entry);

        self.version.fetch_add(1, Ordering::SeqCst);
        self.append_log(key, feedback_id, &old, &new);
        Ok(Some(new))
    }

    fn entry_mut(&self, key: &ParamKey) -> PlexusResult<RefMut<'_, ParamKey, Entry>> {
        let mut attempt = 0u32;
        loop {
            match self.params.try_get_mut(key) {
                TryResult::Present(entry) => return Ok(entry),
                TryResult::Absent => {
                    return Err(LearningError::UnknownParameter(key.to_string()).into());
                }
                TryResult::Locked => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        return Err(LearningError::UpdateConflict {
                            key: key.to_string(),
                            attempts: attempt,
                        }
                        .into());
                    }
                    // Linear backoff; contention on a single key is short.
                    std::thread::sleep(self.retry_backoff * attempt);
                }
            }
        }
    }

    fn append_log(
        &self,
        key: ParamKey,
        feedback_id: Option<&FeedbackId>,
        old: &ParamValue,
        new: &ParamValue,
    ) {
        let change = ParameterChange {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            timestamp: Utc::now(),
            feedback_id: feedback_id.cloned(),
            key,
            old_value: old.to_json(),
            new_value: new.to_json(),
        };
        debug!(key = %change.key, seq = change.seq, "parameter changed");
        self.lock_log().push(change);
    }

    /// Drain accumulated change-log entries, e.g. into persistence.
    pub fn drain_log(&self) -> Vec<ParameterChange> {
        std::mem::take(&mut *self.lock_log())
    }

    /// Put drained entries back at the front of the log, preserving their
    /// sequence order. Callers use this when persisting a drained batch
    /// fails, so the entries surface again at the next drain.
    pub fn requeue_log(&self, mut entries: Vec<ParameterChange>) {
        if entries.is_empty() {
            return;
        }
        let mut log = self.lock_log();
        entries.append(&mut log);
        *log = entries;
    }

    // The lock only guards Vec operations that cannot leave the log in a
    // bad state, so a poisoned lock is recovered rather than propagated.
    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<ParameterChange>> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Read one scalar parameter.
    pub fn scalar(&self, key: ParamKey) -> Option<Weight> {
        self.params.get(&key).and_then(|e| match &e.value {
            ParamValue::Scalar(w) => Some(*w),
            _ => None,
        })
    }

    /// Last-update times of every traversal weight, for the decay sweep's
    /// freshness check.
    pub fn traversal_ages(&self) -> Vec<(StrategyId, RelationType, Weight, DateTime<Utc>)> {
        self.params
            .iter()
            .filter_map(|entry| match (entry.key(), &entry.value().value) {
                (&ParamKey::Traversal(strategy, relation), ParamValue::Scalar(w)) => {
                    Some((strategy, relation, *w, entry.value().updated_at))
                }
                _ => None,
            })
            .collect()
    }

    /// Point-in-time snapshot of every parameter. Queries run against a
    /// snapshot, never against the live store.
    pub fn snapshot(&self) -> ParameterSnapshot {
        let mut strategies = priors::default_strategies();
        let mut alphas = std::collections::HashMap::new();
        let mut gating = GatingParameters::uniform(self.embedding_dim);
        let mut rerank = RerankParameters::default();

        for entry in self.params.iter() {
            match (entry.key(), &entry.value().value) {
                (&ParamKey::Traversal(strategy_id, relation), ParamValue::Scalar(w)) => {
                    if let Some(strategy) = strategies.get_mut(&strategy_id) {
                        strategy.traversal_weights.insert(relation, *w);
                    }
                }
                (&ParamKey::Alpha(strategy_id), ParamValue::Scalar(w)) => {
                    alphas.insert(strategy_id, *w);
                }
                (&ParamKey::GatingRow(strategy_id), ParamValue::GatingRow { weights, bias }) => {
                    let idx = strategy_id.index();
                    gating.rows[idx] = weights.clone();
                    gating.bias[idx] = *bias;
                }
                (&ParamKey::Rerank, ParamValue::Rerank(w)) => {
                    rerank.weights = *w;
                }
                _ => {}
            }
        }

        ParameterSnapshot {
            strategies,
            alphas,
            gating,
            rerank,
            version: self.version.load(Ordering::SeqCst),
            taken_at: Utc::now(),
        }
    }

    /// Restore one parameter from persisted state at bootstrap.
    pub fn restore(&self, key: ParamKey, value: ParamValue) {
        if let Some(mut entry) = self.params.get_mut(&key) {
            entry.value = value;
            entry.updated_at = Utc::now();
        }
    }

    /// Restore a traversal weight with its persisted update time, so the
    /// decay freshness check survives restarts.
    pub fn restore_traversal(
        &self,
        strategy: StrategyId,
        relation: RelationType,
        weight: Weight,
        updated_at: DateTime<Utc>,
    ) {
        if let Some(mut entry) = self.params.get_mut(&ParamKey::Traversal(strategy, relation)) {
            entry.value = ParamValue::Scalar(weight);
            entry.updated_at = updated_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::from_priors(4, &LearningConfig::default())
    }

    #[test]
    fn snapshot_reflects_priors_at_bootstrap() {
        let store = store();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.version, 0);
        let semantic = &snapshot.strategies[&StrategyId::Semantic];
        assert!(
            (semantic.traversal_weights[&RelationType::Defines].value() - 0.9).abs() < 1e-12
        );
        assert!((snapshot.alpha(StrategyId::Causal, 0.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn mutation_bumps_versions_and_logs() {
        let store = store();
        let key = ParamKey::Traversal(StrategyId::Semantic, RelationType::Defines);
        store
            .mutate(key, None, |old| match old {
                ParamValue::Scalar(w) => ParamValue::Scalar(w.apply_delta(-0.2)),
                other => other.clone(),
            })
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.version, 1);
        let w = snapshot.strategies[&StrategyId::Semantic].traversal_weights
            [&RelationType::Defines]
            .value();
        assert!((w - 0.7).abs() < 1e-9);

        let log = store.drain_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].key, key);
        assert!(store.drain_log().is_empty());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let store = store();
        // Semantic strategy has no `causes` traversal weight.
        let result = store.mutate(
            ParamKey::Traversal(StrategyId::Semantic, RelationType::Causes),
            None,
            |old| old.clone(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn declined_timed_mutation_changes_nothing() {
        let store = store();
        let key = ParamKey::Traversal(StrategyId::Semantic, RelationType::Defines);
        let result = store.mutate_timed(key, None, |_, _| None).unwrap();
        assert!(result.is_none());
        assert_eq!(store.snapshot().version, 0);
        assert!(store.drain_log().is_empty());
    }

    #[test]
    fn timed_mutation_sees_the_current_value_and_time() {
        let store = store();
        let key = ParamKey::Alpha(StrategyId::Semantic);
        store
            .mutate(key, None, |_| ParamValue::Scalar(Weight::new(0.2)))
            .unwrap();

        let seen = std::cell::Cell::new(None);
        store
            .mutate_timed(key, None, |value, updated_at| {
                if let ParamValue::Scalar(w) = value {
                    seen.set(Some((w.value(), updated_at)));
                }
                None
            })
            .unwrap();

        let (value, updated_at) = seen.get().unwrap();
        assert!((value - 0.2).abs() < 1e-12);
        assert!((Utc::now() - updated_at).num_seconds() < 5);
    }

    #[test]
    fn requeued_changes_drain_again_in_order() {
        let store = store();
        let key = ParamKey::Alpha(StrategyId::Semantic);
        for v in [0.1, 0.2, 0.3] {
            store
                .mutate(key, None, |_| ParamValue::Scalar(Weight::new(v)))
                .unwrap();
        }
        let drained = store.drain_log();
        let seqs: Vec<_> = drained.iter().map(|c| c.seq).collect();
        assert_eq!(drained.len(), 3);

        // A persistence failure hands the batch back; a later change
        // appends after it.
        store.requeue_log(drained);
        store
            .mutate(key, None, |_| ParamValue::Scalar(Weight::new(0.4)))
            .unwrap();

        let again = store.drain_log();
        assert_eq!(again.len(), 4);
        assert_eq!(again.iter().map(|c| c.seq).collect::<Vec<_>>()[..3], seqs[..]);
        assert!(again[3].seq > seqs[2]);
    }

    #[test]
    fn conflicting_update_surfaces_after_bounded_retries() {
        use std::sync::Arc;

        let config = LearningConfig {
            update_max_retries: 1,
            update_retry_backoff_ms: 1,
            ..LearningConfig::default()
        };
        let store = Arc::new(ParameterStore::from_priors(4, &config));
        let key = ParamKey::Alpha(StrategyId::Semantic);

        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let holder = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store
                    .mutate(key, None, |old| {
                        entered_tx.send(()).unwrap();
                        std::thread::sleep(Duration::from_millis(300));
                        old.clone()
                    })
                    .unwrap();
            })
        };
        entered_rx.recv().unwrap();

        let err = store.mutate(key, None, |old| old.clone()).unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::UpdateConflict { .. })
        ));
        holder.join().unwrap();
    }

    #[test]
    fn store_survives_a_panicking_mutation() {
        let store = store();
        let key = ParamKey::Alpha(StrategyId::Semantic);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = store.mutate(key, None, |_| panic!("bad closure"));
        }));
        assert!(result.is_err());

        store
            .mutate(key, None, |_| ParamValue::Scalar(Weight::new(0.3)))
            .unwrap();
        assert_eq!(store.drain_log().len(), 1);
    }

    #[test]
    fn snapshots_are_isolated_from_later_mutations() {
        let store = store();
        let before = store.snapshot();
        store
            .mutate(ParamKey::Alpha(StrategyId::Semantic), None, |_| {
                ParamValue::Scalar(Weight::new(0.1))
            })
            .unwrap();
        // The old snapshot still sees the old alpha.
        assert!((before.alpha(StrategyId::Semantic, 0.0) - 0.6).abs() < 1e-12);
        let after = store.snapshot();
        assert!((after.alpha(StrategyId::Semantic, 0.0) - 0.1).abs() < 1e-12);
    }
}
