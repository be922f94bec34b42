//! Feedback event model: structured per-layer judgments emitted by the
//! external reasoning/synthesis collaborator after it consumed a ranked
//! candidate list.
//!
//! Judgments are a closed sum of optional sub-fields. Missing sub-fields
//! resolve to a neutral 0.5 at reward decomposition time so incomplete
//! feedback is never penalized; unknown shapes are rejected at the
//! serde boundary (`deny_unknown_fields`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FeedbackId, StrategyId, TraceId, UserId};

/// Judgments about the retrieval layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalJudgment {
    /// Were the returned sources relevant to the query?
    pub sources_relevant: Option<bool>,
    /// Did the sources cover everything the answer needed?
    pub sources_complete: Option<bool>,
    /// Quality of the ordering, in [0,1].
    pub ranking_quality: Option<f64>,
}

/// Judgments about the reasoning layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReasoningJudgment {
    /// Agreement with the chosen strategy's line of reasoning, in [0,1].
    pub strategy_agreement: Option<f64>,
    /// Were the intermediate steps valid?
    pub steps_valid: Option<bool>,
    /// Was the conclusion supported by the retrieved evidence?
    pub conclusion_supported: Option<bool>,
    /// Which strategy the judge considered best for this query, if any.
    pub best_strategy: Option<StrategyId>,
}

/// Judgments about the synthesis layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisJudgment {
    /// Was the final answer correct?
    pub answer_correct: Option<bool>,
    /// Correctness of the final ranking the answer was built from, in [0,1].
    pub ranking_correct: Option<f64>,
}

/// Per-layer judgments for one feedback event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerJudgments {
    #[serde(default)]
    pub retrieval: RetrievalJudgment,
    #[serde(default)]
    pub reasoning: ReasoningJudgment,
    #[serde(default)]
    pub synthesis: SynthesisJudgment,
}

/// One feedback record against a completed retrieval trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub id: FeedbackId,
    pub trace_id: TraceId,
    pub user_id: UserId,
    pub domain: String,
    pub judgments: LayerJudgments,
    /// Which retrieval iteration of the trace this feedback refers to,
    /// counted back from the final one (0 = final iteration).
    #[serde(default)]
    pub iterations_from_final: u32,
    pub timestamp: DateTime<Utc>,
}

/// Consensus outcome for a past feedback event, used to update the
/// feedback provider's authority once validation resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Consensus agreed with the feedback.
    Confirmed,
    /// Consensus contradicted the feedback.
    Contradicted,
}
