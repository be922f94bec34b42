//! Gating network: maps a query embedding to a probability distribution
//! over the fixed strategy set.
//!
//! Linear logits + softmax, so the output is a valid simplex for any
//! input. A degenerate (zero-norm or empty) embedding returns the uniform
//! distribution rather than an error.

use plexus_core::types::{GatingParameters, StrategyId};

pub struct GatingNetwork<'a> {
    params: &'a GatingParameters,
}

impl<'a> GatingNetwork<'a> {
    pub fn new(params: &'a GatingParameters) -> Self {
        Self { params }
    }

    /// Probability distribution over strategies, indexed like
    /// `StrategyId::ALL`. Sums to 1, all entries non-negative.
    pub fn forward(&self, embedding: &[f32]) -> Vec<f64> {
        let norm: f64 = embedding.iter().map(|x| (*x as f64).abs()).sum();
        if embedding.is_empty() || norm < f64::EPSILON {
            return vec![1.0 / StrategyId::COUNT as f64; StrategyId::COUNT];
        }

        let logits: Vec<f64> = StrategyId::ALL
            .iter()
            .map(|&s| self.params.logit(s, embedding))
            .collect();
        softmax(&logits)
    }

    /// The strategy the distribution favors. Deterministic: ties break
    /// toward the earlier strategy in the fixed order.
    pub fn choose(distribution: &[f64]) -> StrategyId {
        let mut best = 0;
        for (i, p) in distribution.iter().enumerate() {
            if *p > distribution[best] {
                best = i;
            }
        }
        StrategyId::ALL[best]
    }
}

/// Numerically stable softmax (max-subtracted).
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum < f64::EPSILON {
        return vec![1.0 / logits.len() as f64; logits.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_embedding_yields_uniform() {
        let params = GatingParameters::uniform(4);
        let gating = GatingNetwork::new(&params);
        let dist = gating.forward(&[0.0, 0.0, 0.0, 0.0]);
        for p in &dist {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_embedding_yields_uniform() {
        let params = GatingParameters::uniform(4);
        let gating = GatingNetwork::new(&params);
        let dist = gating.forward(&[]);
        assert_eq!(dist.len(), StrategyId::COUNT);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn biased_logits_shift_the_distribution() {
        let mut params = GatingParameters::uniform(2);
        params.bias[StrategyId::Causal.index()] = 2.0;
        let gating = GatingNetwork::new(&params);
        let dist = gating.forward(&[1.0, 0.0]);
        assert_eq!(GatingNetwork::choose(&dist), StrategyId::Causal);
        assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn choose_breaks_ties_toward_first() {
        let dist = vec![0.25, 0.25, 0.25, 0.25];
        assert_eq!(GatingNetwork::choose(&dist), StrategyId::Semantic);
    }
}
