use proptest::prelude::*;

use plexus_core::types::Weight;

proptest! {
    /// Construction clamps any input into [0,1].
    #[test]
    fn weight_is_always_bounded(raw in -1e6..1e6f64) {
        let w = Weight::new(raw).value();
        prop_assert!((0.0..=1.0).contains(&w));
    }

    /// No delta sequence can push a weight out of range.
    #[test]
    fn deltas_cannot_escape_the_range(
        start in 0.0..=1.0f64,
        deltas in proptest::collection::vec(-2.0..2.0f64, 0..64),
    ) {
        let mut w = Weight::new(start);
        for d in deltas {
            w = w.apply_delta(d);
            prop_assert!((0.0..=1.0).contains(&w.value()));
        }
    }

    /// Arithmetic stays saturating, never wrapping or panicking.
    #[test]
    fn arithmetic_saturates(a in 0.0..=1.0f64, b in 0.0..=1.0f64, k in 0.0..10.0f64) {
        let x = Weight::new(a);
        let y = Weight::new(b);
        prop_assert!(((x + y).value()) <= 1.0);
        prop_assert!(((x - y).value()) >= 0.0);
        prop_assert!((0.0..=1.0).contains(&(x * k).value()));
    }
}
