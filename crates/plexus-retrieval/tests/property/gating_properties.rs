use plexus_core::types::{GatingParameters, StrategyId};
use plexus_retrieval::GatingNetwork;
use proptest::prelude::*;

proptest! {
    // The gating output is a valid probability distribution for any
    // input, any parameters.
    #[test]
    fn output_is_a_simplex(
        embedding in prop::collection::vec(-100.0f32..100.0, 1..32),
        bias in prop::collection::vec(-10.0f64..10.0, 4),
    ) {
        let mut params = GatingParameters::uniform(embedding.len());
        params.bias = bias;
        let gating = GatingNetwork::new(&params);
        let dist = gating.forward(&embedding);

        prop_assert_eq!(dist.len(), StrategyId::COUNT);
        for p in &dist {
            prop_assert!(*p >= 0.0, "negative probability: {}", p);
            prop_assert!(p.is_finite());
        }
        let sum: f64 = dist.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
    }

    // Extreme logit weights must not produce NaN or a degenerate sum.
    #[test]
    fn numerically_stable_under_large_weights(
        scale in 1.0f64..1e6,
        embedding in prop::collection::vec(-1.0f32..1.0, 8),
    ) {
        let mut params = GatingParameters::uniform(8);
        for row in &mut params.rows {
            for w in row.iter_mut() {
                *w = scale;
            }
        }
        let gating = GatingNetwork::new(&params);
        let dist = gating.forward(&embedding);
        let sum: f64 = dist.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }
}
