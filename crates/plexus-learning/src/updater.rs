//! Policy-gradient parameter updates.
//!
//! One feedback event yields three per-layer advantages. Each parameter
//! family learns from the layer that judges it: traversal weights, alphas,
//! and bridge-link weights from the retrieval reward, the gating network
//! from the reasoning reward, and the rerank weights from the synthesis
//! reward. Every step is scaled by the provider's authority and by the
//! iteration credit of the judged retrieval pass.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use plexus_core::config::LearningConfig;
use plexus_core::errors::{PlexusError, PlexusResult};
use plexus_core::traits::IBridgeIndex;
use plexus_core::types::{
    ChunkId, FeedbackId, FeedbackLevel, NodeId, ParamKey, RelationType, RerankFeatures,
    RetrievalTrace, StrategyId, Weight,
};

use crate::store::{ParamValue, ParameterStore};

/// Per-level step scales for one feedback event:
/// `learning_rate * authority * advantage * iteration_credit`.
#[derive(Debug, Clone, Copy)]
pub struct StepScales {
    pub retrieval: f64,
    pub reasoning: f64,
    pub synthesis: f64,
}

impl StepScales {
    pub fn get(&self, level: FeedbackLevel) -> f64 {
        match level {
            FeedbackLevel::Retrieval => self.retrieval,
            FeedbackLevel::Reasoning => self.reasoning,
            FeedbackLevel::Synthesis => self.synthesis,
        }
    }
}

/// An apply that stopped partway: `applied` mutations landed before
/// `error` stopped the rest.
#[derive(Debug)]
pub struct PartialApply {
    pub applied: usize,
    pub error: PlexusError,
}

pub struct PolicyGradientUpdater {
    store: Arc<ParameterStore>,
    bridge: Arc<dyn IBridgeIndex>,
    config: LearningConfig,
}

impl PolicyGradientUpdater {
    pub fn new(
        store: Arc<ParameterStore>,
        bridge: Arc<dyn IBridgeIndex>,
        config: LearningConfig,
    ) -> Self {
        Self {
            store,
            bridge,
            config,
        }
    }

    pub fn store(&self) -> &Arc<ParameterStore> {
        &self.store
    }

    /// Apply one feedback event's updates against the trace that produced
    /// the judged output. Returns the number of parameter mutations; an
    /// error carries how many had already landed when it struck.
    pub fn apply(
        &self,
        trace: &RetrievalTrace,
        scales: StepScales,
        target_strategy: Option<StrategyId>,
        feedback_id: &FeedbackId,
    ) -> Result<usize, PartialApply> {
        let mut applied = 0usize;
        if let Err(error) =
            self.apply_families(trace, scales, target_strategy, feedback_id, &mut applied)
        {
            return Err(PartialApply { applied, error });
        }

        debug!(
            trace = %trace.trace_id,
            feedback = %feedback_id,
            applied,
            "policy-gradient updates applied"
        );
        Ok(applied)
    }

    fn apply_families(
        &self,
        trace: &RetrievalTrace,
        scales: StepScales,
        target_strategy: Option<StrategyId>,
        feedback_id: &FeedbackId,
        applied: &mut usize,
    ) -> PlexusResult<()> {
        self.update_traversal(trace, scales.retrieval, feedback_id, applied)?;
        self.update_alphas(trace, scales.retrieval, feedback_id, applied)?;
        *applied += self.update_bridge_links(trace, scales.retrieval, feedback_id);
        self.update_gating(trace, scales.reasoning, target_strategy, feedback_id, applied)?;
        self.update_rerank(trace, scales.synthesis, feedback_id, applied)?;
        Ok(())
    }

    /// Traversal weights: the log-probability gradient of a multiplicative
    /// path score with respect to one edge weight is `uses / w`, where
    /// `uses` counts that relation on the winning paths. Weights are kept
    /// above the floor so the gradient stays finite.
    fn update_traversal(
        &self,
        trace: &RetrievalTrace,
        scale: f64,
        feedback_id: &FeedbackId,
        applied: &mut usize,
    ) -> PlexusResult<()> {
        if scale == 0.0 {
            return Ok(());
        }

        // BTreeMap keeps the mutation order deterministic.
        let mut uses: BTreeMap<(StrategyId, RelationType), u32> = BTreeMap::new();
        for candidate in &trace.candidates {
            for &relation in &candidate.path_relations {
                *uses.entry((candidate.strategy, relation)).or_insert(0) += 1;
            }
        }

        for ((strategy, relation), count) in uses {
            let key = ParamKey::Traversal(strategy, relation);
            self.store.mutate(key, Some(feedback_id), |old| {
                let ParamValue::Scalar(w) = old else {
                    return old.clone();
                };
                let w_safe = w.value().max(Weight::TRAVERSAL_FLOOR);
                let delta = scale * count as f64 / w_safe;
                let new = (w.value() + delta).clamp(Weight::TRAVERSAL_FLOOR, 1.0);
                ParamValue::Scalar(Weight::new(new))
            })?;
            *applied += 1;
        }
        Ok(())
    }

    /// Alphas: ascend along the score-difference direction. A positive
    /// advantage with vector evidence ahead of graph evidence pushes alpha
    /// toward the vector side, and vice versa.
    fn update_alphas(
        &self,
        trace: &RetrievalTrace,
        scale: f64,
        feedback_id: &FeedbackId,
        applied: &mut usize,
    ) -> PlexusResult<()> {
        if scale == 0.0 {
            return Ok(());
        }

        let mut sums: BTreeMap<StrategyId, (f64, u32)> = BTreeMap::new();
        for candidate in &trace.candidates {
            let entry = sums.entry(candidate.strategy).or_insert((0.0, 0));
            entry.0 += candidate.vector_score - candidate.graph_score;
            entry.1 += 1;
        }

        for (strategy, (sum, n)) in sums {
            let mean_diff = sum / n as f64;
            self.store
                .mutate(ParamKey::Alpha(strategy), Some(feedback_id), |old| {
                    let ParamValue::Scalar(a) = old else {
                        return old.clone();
                    };
                    ParamValue::Scalar(a.apply_delta(scale * mean_diff))
                })?;
            *applied += 1;
        }
        Ok(())
    }

    /// Bridge-link weights: every link that carried graph evidence for a
    /// returned candidate shares the retrieval-layer credit. A link whose
    /// mapping vanished since retrieval is skipped, not fatal.
    fn update_bridge_links(
        &self,
        trace: &RetrievalTrace,
        scale: f64,
        feedback_id: &FeedbackId,
    ) -> usize {
        if scale == 0.0 {
            return 0;
        }

        let mut seen: HashSet<(ChunkId, NodeId, RelationType)> = HashSet::new();
        let mut applied = 0;
        for candidate in &trace.candidates {
            let Some((node, relation)) = &candidate.bridge_link else {
                continue;
            };
            if !seen.insert((candidate.chunk_id.clone(), node.clone(), *relation)) {
                continue;
            }
            match self
                .bridge
                .update_weight(&candidate.chunk_id, node, *relation, scale)
            {
                Ok(_) => applied += 1,
                Err(e) => {
                    warn!(
                        chunk = %candidate.chunk_id,
                        node = %node,
                        feedback = %feedback_id,
                        error = %e,
                        "bridge weight update skipped"
                    );
                }
            }
        }
        applied
    }

    /// Gating: softmax policy gradient. Row `j` moves by
    /// `scale * (1[j = target] - pi_j) * x` where `x` is the query
    /// embedding and `pi` is the distribution recorded in the trace. The
    /// target is the judge's preferred strategy when given, otherwise the
    /// strategy the gate chose.
    fn update_gating(
        &self,
        trace: &RetrievalTrace,
        scale: f64,
        target_strategy: Option<StrategyId>,
        feedback_id: &FeedbackId,
        applied: &mut usize,
    ) -> PlexusResult<()> {
        if scale == 0.0 || trace.query_embedding.is_empty() {
            return Ok(());
        }
        let target = target_strategy.unwrap_or(trace.chosen_strategy);

        for &strategy in &StrategyId::ALL {
            let pi = trace
                .gating_distribution
                .get(strategy.index())
                .copied()
                .unwrap_or(1.0 / StrategyId::COUNT as f64);
            let indicator = if strategy == target { 1.0 } else { 0.0 };
            let step = scale * (indicator - pi);
            if step == 0.0 {
                continue;
            }

            self.store
                .mutate(ParamKey::GatingRow(strategy), Some(feedback_id), |old| {
                    let ParamValue::GatingRow { weights, bias } = old else {
                        return old.clone();
                    };
                    let weights = weights
                        .iter()
                        .zip(trace.query_embedding.iter())
                        .map(|(w, x)| w + step * *x as f64)
                        .collect();
                    ParamValue::GatingRow {
                        weights,
                        bias: bias + step,
                    }
                })?;
            *applied += 1;
        }
        Ok(())
    }

    /// Rerank weights: ascend along the mean feature vector of the
    /// returned candidates. A positive synthesis advantage reinforces the
    /// feature mix that produced the ranking.
    fn update_rerank(
        &self,
        trace: &RetrievalTrace,
        scale: f64,
        feedback_id: &FeedbackId,
        applied: &mut usize,
    ) -> PlexusResult<()> {
        if scale == 0.0 || trace.candidates.is_empty() {
            return Ok(());
        }

        let mut mean = [0.0f64; 4];
        for candidate in &trace.candidates {
            let gating_prob = trace
                .gating_distribution
                .get(candidate.strategy.index())
                .copied()
                .unwrap_or(1.0 / StrategyId::COUNT as f64);
            let hop_factor = if candidate.bridge_link.is_some() {
                1.0 / (1.0 + candidate.hops as f64)
            } else {
                0.0
            };
            let features = RerankFeatures {
                vector_score: candidate.vector_score,
                graph_score: candidate.graph_score,
                gating_prob,
                hop_factor,
            };
            for (m, f) in mean.iter_mut().zip(features.as_array()) {
                *m += f;
            }
        }
        let n = trace.candidates.len() as f64;
        for m in &mut mean {
            *m /= n;
        }

        self.store
            .mutate(ParamKey::Rerank, Some(feedback_id), |old| {
                let ParamValue::Rerank(weights) = old else {
                    return old.clone();
                };
                let mut next = *weights;
                for (w, m) in next.iter_mut().zip(mean) {
                    *w += scale * m;
                }
                ParamValue::Rerank(next)
            })?;
        *applied += 1;
        Ok(())
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }
}
