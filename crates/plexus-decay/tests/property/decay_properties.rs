use proptest::prelude::*;

use plexus_decay::formula::decay_toward_prior;

proptest! {
    /// Decay never overshoots: the result stays between the old value and
    /// the prior.
    #[test]
    fn decay_stays_between_value_and_prior(
        old in 0.0..=1.0f64,
        prior in 0.0..=1.0f64,
        days in 0.0..5000.0f64,
        rate in 0.5..0.9999f64,
    ) {
        let new = decay_toward_prior(old, prior, days, rate);
        let lo = old.min(prior);
        let hi = old.max(prior);
        prop_assert!(new >= lo - 1e-12 && new <= hi + 1e-12);
    }

    /// More elapsed time never moves the result away from the prior.
    #[test]
    fn decay_is_monotone_in_time(
        old in 0.0..=1.0f64,
        prior in 0.0..=1.0f64,
        days in 0.0..2000.0f64,
        extra in 0.0..2000.0f64,
        rate in 0.5..0.9999f64,
    ) {
        let earlier = decay_toward_prior(old, prior, days, rate);
        let later = decay_toward_prior(old, prior, days + extra, rate);
        prop_assert!((later - prior).abs() <= (earlier - prior).abs() + 1e-12);
    }

    /// Splitting an interval produces the same result as decaying over it
    /// in one step.
    #[test]
    fn decay_composes(
        old in 0.0..=1.0f64,
        prior in 0.0..=1.0f64,
        d1 in 0.0..1000.0f64,
        d2 in 0.0..1000.0f64,
        rate in 0.5..0.9999f64,
    ) {
        let split = decay_toward_prior(decay_toward_prior(old, prior, d1, rate), prior, d2, rate);
        let whole = decay_toward_prior(old, prior, d1 + d2, rate);
        prop_assert!((split - whole).abs() < 1e-9);
    }

    /// Every weight converges: after enough unreinforced time the gap to
    /// the prior drops below any tolerance the rate allows.
    #[test]
    fn decay_converges_to_prior(
        old in 0.0..=1.0f64,
        prior in 0.0..=1.0f64,
    ) {
        let after = decay_toward_prior(old, prior, 1000.0, 0.995);
        prop_assert!((after - prior).abs() < 0.01);
    }
}
