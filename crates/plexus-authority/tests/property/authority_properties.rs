use proptest::prelude::*;

use plexus_authority::AuthorityCalculator;
use plexus_core::config::AuthorityConfig;
use plexus_core::feedback::ValidationOutcome;
use plexus_core::types::FeedbackLevel;

proptest! {
    /// Authority stays in [0,1] under any outcome sequence and credential.
    #[test]
    fn authority_is_always_bounded(
        outcomes in proptest::collection::vec(any::<bool>(), 0..100),
        credential in 0.0..=1.0f64,
    ) {
        let calc = AuthorityCalculator::new(AuthorityConfig::default());
        let user = "someone".into();
        calc.set_baseline_credential(&user, credential);
        for confirmed in outcomes {
            let outcome = if confirmed {
                ValidationOutcome::Confirmed
            } else {
                ValidationOutcome::Contradicted
            };
            calc.update_from_feedback(&user, FeedbackLevel::Reasoning, "d", outcome);
            let a = calc.get_authority(&user, FeedbackLevel::Reasoning, "d");
            prop_assert!((0.0..=1.0).contains(&a));
        }
    }

    /// An all-confirmed history never yields lower authority than the
    /// same-length all-contradicted history.
    #[test]
    fn confirmations_dominate_contradictions(n in 1usize..60) {
        let good = AuthorityCalculator::new(AuthorityConfig::default());
        let bad = AuthorityCalculator::new(AuthorityConfig::default());
        let user = "someone".into();
        for _ in 0..n {
            good.update_from_feedback(
                &user, FeedbackLevel::Retrieval, "d", ValidationOutcome::Confirmed,
            );
            bad.update_from_feedback(
                &user, FeedbackLevel::Retrieval, "d", ValidationOutcome::Contradicted,
            );
        }
        let a_good = good.get_authority(&user, FeedbackLevel::Retrieval, "d");
        let a_bad = bad.get_authority(&user, FeedbackLevel::Retrieval, "d");
        prop_assert!(a_good >= a_bad);
    }
}
