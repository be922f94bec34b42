//! Reward decomposition: one feedback event becomes three scalars in
//! [0,1], one per layer, via fixed weighted sums of sub-judgments.
//!
//! Missing sub-fields default to a neutral 0.5 so incomplete feedback is
//! not penalized. Out-of-range scores are rejected outright at
//! validation, never partially applied.

use plexus_core::errors::{LearningError, PlexusResult};
use plexus_core::feedback::{FeedbackEvent, LayerJudgments};
use plexus_core::types::{FeedbackLevel, Weight};

/// Retrieval reward mix: relevance / completeness / ranking quality.
const RETRIEVAL_MIX: [f64; 3] = [0.4, 0.3, 0.3];
/// Reasoning reward mix: strategy agreement / step validity / support.
const REASONING_MIX: [f64; 3] = [0.5, 0.3, 0.2];
/// Synthesis reward mix: answer correctness / ranking correctness.
const SYNTHESIS_MIX: [f64; 2] = [0.6, 0.4];

/// The three per-layer rewards decomposed from one feedback event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerRewards {
    pub retrieval: f64,
    pub reasoning: f64,
    pub synthesis: f64,
}

impl LayerRewards {
    pub fn get(&self, level: FeedbackLevel) -> f64 {
        match level {
            FeedbackLevel::Retrieval => self.retrieval,
            FeedbackLevel::Reasoning => self.reasoning,
            FeedbackLevel::Synthesis => self.synthesis,
        }
    }
}

fn from_bool(value: Option<bool>) -> f64 {
    match value {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => Weight::NEUTRAL,
    }
}

fn from_unit(value: Option<f64>) -> f64 {
    value.unwrap_or(Weight::NEUTRAL)
}

/// Reject malformed feedback at the boundary: any explicit score outside
/// [0,1] invalidates the whole event.
pub fn validate(event: &FeedbackEvent) -> PlexusResult<()> {
    let j = &event.judgments;
    let unit_fields = [
        ("retrieval.ranking_quality", j.retrieval.ranking_quality),
        ("reasoning.strategy_agreement", j.reasoning.strategy_agreement),
        ("synthesis.ranking_correct", j.synthesis.ranking_correct),
    ];
    for (name, value) in unit_fields {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) || v.is_nan() {
                return Err(LearningError::InvalidJudgment(format!(
                    "{name} out of range: {v}"
                ))
                .into());
            }
        }
    }
    Ok(())
}

/// Decompose validated judgments into per-layer rewards.
pub fn decompose(judgments: &LayerJudgments) -> LayerRewards {
    let retrieval = RETRIEVAL_MIX[0] * from_bool(judgments.retrieval.sources_relevant)
        + RETRIEVAL_MIX[1] * from_bool(judgments.retrieval.sources_complete)
        + RETRIEVAL_MIX[2] * from_unit(judgments.retrieval.ranking_quality);

    let reasoning = REASONING_MIX[0] * from_unit(judgments.reasoning.strategy_agreement)
        + REASONING_MIX[1] * from_bool(judgments.reasoning.steps_valid)
        + REASONING_MIX[2] * from_bool(judgments.reasoning.conclusion_supported);

    let synthesis = SYNTHESIS_MIX[0] * from_bool(judgments.synthesis.answer_correct)
        + SYNTHESIS_MIX[1] * from_unit(judgments.synthesis.ranking_correct);

    LayerRewards {
        retrieval,
        reasoning,
        synthesis,
    }
}

/// Credit multiplier for a feedback event `n` retrieval iterations before
/// the final one. The final iteration shaped the judged answer and gets
/// full credit; earlier iterations decay geometrically.
pub fn iteration_credit(iterations_from_final: u32, decay: f64) -> f64 {
    decay.powi(iterations_from_final as i32)
}
