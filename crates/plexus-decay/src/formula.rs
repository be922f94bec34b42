//! Exponential blend toward the prior.
//!
//! ```text
//! theta_new = rate^days * theta_old + (1 - rate^days) * prior
//! ```
//!
//! The blend composes exactly: decaying over `d1` days and then over `d2`
//! days equals one decay over `d1 + d2` days. The sweep schedule therefore
//! never changes the trajectory, only how often it is materialized.

/// Decay one weight `days` days past its last reinforcement.
pub fn decay_toward_prior(old: f64, prior: f64, days: f64, rate: f64) -> f64 {
    debug_assert!((0.0..1.0).contains(&rate));
    let retention = rate.powf(days.max(0.0));
    retention * old + (1.0 - retention) * prior
}
