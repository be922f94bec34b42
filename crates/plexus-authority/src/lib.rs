//! # plexus-authority
//!
//! Multilevel authority calculator: a per-user trust score by feedback
//! layer and domain, blending baseline credential, lifetime track record,
//! and recent performance.
//!
//! `authority = a * baseline_credential + b * track_record + c * recent`
//! with a + b + c = 1 (defaults 0.3 / 0.5 / 0.2), clamped to [0,1].
//! Unseen users get a neutral prior. Evidence accrues only once delayed
//! consensus validates or contradicts a past feedback event, so updates
//! arrive asynchronously relative to feedback ingestion.

mod calculator;
mod record;

pub use calculator::AuthorityCalculator;
pub use record::{AuthorityEvidence, LevelEvidence, UserAuthority};
