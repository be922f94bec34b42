//! Feedback ingestion pipeline: validate, dedupe, decompose, weight by
//! authority, apply, then fold the observed rewards into the baselines.

use std::sync::Arc;

use dashmap::DashSet;
use tracing::{info, warn};

use plexus_authority::AuthorityCalculator;
use plexus_core::errors::{LearningError, PlexusResult};
use plexus_core::feedback::{FeedbackEvent, ValidationOutcome};
use plexus_core::types::{FeedbackId, FeedbackLevel, RetrievalTrace, UserId};

use crate::baseline::BaselineTracker;
use crate::reward::{self, LayerRewards};
use crate::updater::{PolicyGradientUpdater, StepScales};

/// Receipt for one ingested feedback event.
#[derive(Debug, Clone)]
pub struct FeedbackAck {
    pub feedback_id: FeedbackId,
    pub rewards: LayerRewards,
    /// Authority the provider carried at each level when the event was
    /// applied.
    pub authorities: [f64; 3],
    pub updates_applied: usize,
    /// Parameter-store version after the event's updates.
    pub store_version: u64,
}

pub struct LearningEngine {
    updater: PolicyGradientUpdater,
    authority: Arc<AuthorityCalculator>,
    baselines: BaselineTracker,
    ingested: DashSet<FeedbackId>,
}

impl LearningEngine {
    pub fn new(updater: PolicyGradientUpdater, authority: Arc<AuthorityCalculator>) -> Self {
        let smoothing = updater.config().baseline_smoothing;
        Self {
            updater,
            authority,
            baselines: BaselineTracker::new(smoothing),
            ingested: DashSet::new(),
        }
    }

    pub fn baselines(&self) -> &BaselineTracker {
        &self.baselines
    }

    /// Ingest one feedback event against its completed trace.
    ///
    /// The whole event is rejected before anything is applied: a malformed
    /// judgment, a duplicate id, or an incomplete trace never produces a
    /// partial update. A failure while applying releases the id only when
    /// no update landed; once any landed, the id stays consumed, since a
    /// resubmission would apply the landed updates twice.
    pub fn ingest(
        &self,
        event: &FeedbackEvent,
        trace: &RetrievalTrace,
    ) -> PlexusResult<FeedbackAck> {
        if trace.trace_id != event.trace_id {
            return Err(LearningError::UnknownTrace(event.trace_id.to_string()).into());
        }
        if !trace.completed {
            return Err(LearningError::IncompleteTrace(trace.trace_id.to_string()).into());
        }
        reward::validate(event)?;
        if !self.ingested.insert(event.id.clone()) {
            return Err(LearningError::DuplicateFeedback(event.id.to_string()).into());
        }

        let rewards = reward::decompose(&event.judgments);
        let credit = reward::iteration_credit(
            event.iterations_from_final,
            self.updater.config().iteration_credit_decay,
        );
        let lr = self.updater.config().learning_rate;

        let mut authorities = [0.0f64; 3];
        let mut scale_for = |level: FeedbackLevel| {
            let authority = self
                .authority
                .get_authority(&event.user_id, level, &event.domain);
            authorities[level as usize] = authority;
            lr * authority * self.baselines.advantage(level, rewards.get(level)) * credit
        };
        let scales = StepScales {
            retrieval: scale_for(FeedbackLevel::Retrieval),
            reasoning: scale_for(FeedbackLevel::Reasoning),
            synthesis: scale_for(FeedbackLevel::Synthesis),
        };

        let target = event.judgments.reasoning.best_strategy;
        let updates_applied = match self.updater.apply(trace, scales, target, &event.id) {
            Ok(applied) => applied,
            Err(partial) => {
                if partial.applied == 0 {
                    self.ingested.remove(&event.id);
                } else {
                    warn!(
                        feedback = %event.id,
                        applied = partial.applied,
                        error = %partial.error,
                        "feedback partially applied, id kept consumed"
                    );
                }
                return Err(partial.error);
            }
        };

        // Baselines move only after the event's updates landed, so the
        // advantage above was computed against the pre-event baseline.
        for level in FeedbackLevel::ALL {
            self.baselines.observe(level, rewards.get(level));
        }

        info!(
            feedback = %event.id,
            trace = %event.trace_id,
            user = %event.user_id,
            domain = %event.domain,
            retrieval_reward = rewards.retrieval,
            reasoning_reward = rewards.reasoning,
            synthesis_reward = rewards.synthesis,
            updates_applied,
            "feedback ingested"
        );

        Ok(FeedbackAck {
            feedback_id: event.id.clone(),
            rewards,
            authorities,
            updates_applied,
            store_version: self.updater.store().snapshot().version,
        })
    }

    /// Record a consensus outcome for one of a user's past feedback
    /// events. Consensus may resolve long after ingestion; authority
    /// changes apply to future events only.
    pub fn resolve_consensus(
        &self,
        user: &UserId,
        level: FeedbackLevel,
        domain: &str,
        outcome: ValidationOutcome,
    ) {
        self.authority.update_from_feedback(user, level, domain, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plexus_bridge::BridgeIndex;
    use plexus_core::config::{AuthorityConfig, LearningConfig};
    use plexus_core::feedback::{LayerJudgments, RetrievalJudgment};
    use plexus_core::types::{CandidateTrace, RelationType, StrategyId, TraceId};

    use crate::store::ParameterStore;

    fn engine() -> LearningEngine {
        let config = LearningConfig::default();
        let store = Arc::new(ParameterStore::from_priors(4, &config));
        let bridge = Arc::new(BridgeIndex::new());
        let updater = PolicyGradientUpdater::new(store, bridge, config);
        let authority = Arc::new(AuthorityCalculator::new(AuthorityConfig::default()));
        LearningEngine::new(updater, authority)
    }

    fn completed_trace() -> RetrievalTrace {
        RetrievalTrace {
            trace_id: TraceId::from("trace-1"),
            domain: "physics".into(),
            query_embedding: vec![1.0, 0.0, 0.0, 0.0],
            gating_distribution: vec![0.25; 4],
            chosen_strategy: StrategyId::Semantic,
            alphas: vec![(StrategyId::Semantic, 0.6)],
            candidates: vec![CandidateTrace {
                chunk_id: "chunk-a".into(),
                strategy: StrategyId::Semantic,
                vector_score: 0.9,
                graph_score: 0.4,
                path_relations: vec![RelationType::Defines],
                hops: 1,
                bridge_link: None,
            }],
            timed_out: vec![],
            completed: true,
            created_at: Utc::now(),
        }
    }

    fn positive_event(id: &str) -> FeedbackEvent {
        FeedbackEvent {
            id: id.into(),
            trace_id: "trace-1".into(),
            user_id: "reviewer".into(),
            domain: "physics".into(),
            judgments: LayerJudgments {
                retrieval: RetrievalJudgment {
                    sources_relevant: Some(true),
                    sources_complete: Some(true),
                    ranking_quality: Some(0.9),
                },
                ..Default::default()
            },
            iterations_from_final: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn positive_feedback_moves_parameters_and_acks() {
        let engine = engine();
        let ack = engine
            .ingest(&positive_event("fb-1"), &completed_trace())
            .unwrap();
        assert!(ack.updates_applied > 0);
        assert!(ack.store_version > 0);
        assert!((ack.rewards.retrieval - 0.97).abs() < 1e-9);
        // Unseen reviewer carries the neutral prior at every level.
        assert!((ack.authorities[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn duplicate_feedback_is_rejected_without_double_counting() {
        let engine = engine();
        let trace = completed_trace();
        let event = positive_event("fb-dup");
        let first = engine.ingest(&event, &trace).unwrap();
        let err = engine.ingest(&event, &trace).unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::DuplicateFeedback(_))
        ));
        // Store version did not advance past the first ingestion.
        let version_now = engine.updater.store().snapshot().version;
        assert_eq!(version_now, first.store_version);
    }

    #[test]
    fn incomplete_trace_is_rejected() {
        let engine = engine();
        let mut trace = completed_trace();
        trace.completed = false;
        let err = engine
            .ingest(&positive_event("fb-inc"), &trace)
            .unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::IncompleteTrace(_))
        ));
    }

    #[test]
    fn out_of_range_judgment_applies_nothing() {
        let engine = engine();
        let mut event = positive_event("fb-bad");
        event.judgments.retrieval.ranking_quality = Some(1.5);
        let err = engine.ingest(&event, &completed_trace()).unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::InvalidJudgment(_))
        ));
        assert_eq!(engine.updater.store().snapshot().version, 0);
        // The id was not consumed: a corrected resubmission succeeds.
        let mut fixed = positive_event("fb-bad");
        fixed.judgments.retrieval.ranking_quality = Some(1.0);
        assert!(engine.ingest(&fixed, &completed_trace()).is_ok());
    }

    fn trace_with_relations(relations: Vec<RelationType>) -> RetrievalTrace {
        let mut trace = completed_trace();
        trace.candidates[0].path_relations = relations;
        trace
    }

    #[test]
    fn failed_apply_with_no_progress_releases_the_id() {
        let engine = engine();
        // Semantic carries no `causes` traversal weight, so the very first
        // mutation fails before anything lands.
        let trace = trace_with_relations(vec![RelationType::Causes]);
        let event = positive_event("fb-retry");
        assert!(engine.ingest(&event, &trace).is_err());
        assert_eq!(engine.updater.store().snapshot().version, 0);

        // The corrected resubmission succeeds under the same id.
        let good = trace_with_relations(vec![RelationType::Defines]);
        assert!(engine.ingest(&event, &good).is_ok());
    }

    #[test]
    fn partially_applied_feedback_cannot_be_replayed() {
        let engine = engine();
        // The valid relation mutates first; the invalid one then stops the
        // apply partway through.
        let trace =
            trace_with_relations(vec![RelationType::Defines, RelationType::Causes]);
        let event = positive_event("fb-partial");
        assert!(engine.ingest(&event, &trace).is_err());
        let version_after = engine.updater.store().snapshot().version;
        assert!(version_after > 0);

        // Replaying the event must not double-count the landed updates.
        let err = engine.ingest(&event, &trace).unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::DuplicateFeedback(_))
        ));
        assert_eq!(engine.updater.store().snapshot().version, version_after);
    }

    #[test]
    fn earlier_iterations_move_parameters_less() {
        let engine_final = engine();
        let engine_early = engine();
        let trace = completed_trace();

        let mut early = positive_event("fb-early");
        early.iterations_from_final = 2;

        engine_final
            .ingest(&positive_event("fb-final"), &trace)
            .unwrap();
        engine_early.ingest(&early, &trace).unwrap();

        let prior = 0.9;
        let w_final = engine_final.updater.store().snapshot().strategies
            [&StrategyId::Semantic]
            .traversal_weights[&RelationType::Defines]
            .value();
        let w_early = engine_early.updater.store().snapshot().strategies
            [&StrategyId::Semantic]
            .traversal_weights[&RelationType::Defines]
            .value();
        assert!(w_final - prior > w_early - prior);
        assert!(w_early > prior);
    }

    #[test]
    fn consensus_outcomes_shift_future_authority() {
        let engine = engine();
        let user: plexus_core::types::UserId = "reviewer".into();
        for _ in 0..10 {
            engine.resolve_consensus(
                &user,
                FeedbackLevel::Retrieval,
                "physics",
                ValidationOutcome::Confirmed,
            );
        }
        let ack = engine
            .ingest(&positive_event("fb-after"), &completed_trace())
            .unwrap();
        assert!(ack.authorities[0] > 0.5);
    }

    #[test]
    fn mismatched_trace_id_is_unknown() {
        let engine = engine();
        let mut trace = completed_trace();
        trace.trace_id = "some-other-trace".into();
        let err = engine
            .ingest(&positive_event("fb-mismatch"), &trace)
            .unwrap_err();
        assert!(matches!(
            err,
            plexus_core::errors::PlexusError::Learning(LearningError::UnknownTrace(_))
        ));
    }
}
