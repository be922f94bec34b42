use proptest::prelude::*;

use plexus_core::feedback::{
    LayerJudgments, ReasoningJudgment, RetrievalJudgment, SynthesisJudgment,
};
use plexus_core::types::{FeedbackLevel, Weight};
use plexus_learning::reward;
use plexus_learning::BaselineTracker;

fn arb_judgments() -> impl Strategy<Value = LayerJudgments> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(0.0..=1.0f64),
        proptest::option::of(0.0..=1.0f64),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(0.0..=1.0f64),
    )
        .prop_map(
            |(relevant, complete, ranking, agreement, steps, supported, correct, rank_ok)| {
                LayerJudgments {
                    retrieval: RetrievalJudgment {
                        sources_relevant: relevant,
                        sources_complete: complete,
                        ranking_quality: ranking,
                    },
                    reasoning: ReasoningJudgment {
                        strategy_agreement: agreement,
                        steps_valid: steps,
                        conclusion_supported: supported,
                        best_strategy: None,
                    },
                    synthesis: SynthesisJudgment {
                        answer_correct: correct,
                        ranking_correct: rank_ok,
                    },
                }
            },
        )
}

proptest! {
    /// Any in-range judgment decomposes to rewards inside [0,1].
    #[test]
    fn rewards_stay_in_unit_interval(judgments in arb_judgments()) {
        let rewards = reward::decompose(&judgments);
        prop_assert!((0.0..=1.0).contains(&rewards.retrieval));
        prop_assert!((0.0..=1.0).contains(&rewards.reasoning));
        prop_assert!((0.0..=1.0).contains(&rewards.synthesis));
    }

    /// Iteration credit is 1 at the final pass and never grows backward.
    #[test]
    fn iteration_credit_is_monotone(decay in 0.0..=1.0f64, n in 0u32..32) {
        let here = reward::iteration_credit(n, decay);
        let earlier = reward::iteration_credit(n + 1, decay);
        prop_assert!(here <= 1.0 + 1e-12);
        prop_assert!(earlier <= here + 1e-12);
    }

    /// The baseline stays inside the convex hull of observed rewards.
    #[test]
    fn baseline_stays_bounded(rewards in proptest::collection::vec(0.0..=1.0f64, 1..200)) {
        let tracker = BaselineTracker::new(0.9);
        for &r in &rewards {
            tracker.observe(FeedbackLevel::Retrieval, r);
        }
        let b = tracker.baseline(FeedbackLevel::Retrieval);
        let lo = rewards.iter().cloned().fold(Weight::NEUTRAL, f64::min);
        let hi = rewards.iter().cloned().fold(Weight::NEUTRAL, f64::max);
        prop_assert!(b >= lo - 1e-9 && b <= hi + 1e-9);
    }
}
