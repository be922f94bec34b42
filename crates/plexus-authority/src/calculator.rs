use dashmap::DashMap;
use tracing::debug;

use plexus_core::config::AuthorityConfig;
use plexus_core::feedback::ValidationOutcome;
use plexus_core::types::{FeedbackLevel, UserId};

use crate::record::{AuthorityEvidence, UserAuthority};

/// Computes and maintains per-user authority scores.
pub struct AuthorityCalculator {
    records: DashMap<UserId, UserAuthority>,
    config: AuthorityConfig,
}

impl AuthorityCalculator {
    pub fn new(config: AuthorityConfig) -> Self {
        Self {
            records: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// Set a user's externally assigned credential, creating the record
    /// if needed.
    pub fn set_baseline_credential(&self, user: &UserId, credential: f64) {
        let mut record = self
            .records
            .entry(user.clone())
            .or_insert_with(|| UserAuthority::new(user.clone(), self.config.prior));
        record.baseline_credential = credential.clamp(0.0, 1.0);
        record.updated_at = chrono::Utc::now();
    }

    /// Authority for (user, level, domain), in [0,1]. Unseen users get
    /// the neutral prior. Domain-scoped evidence is preferred; with none,
    /// level-wide evidence applies; with no history at all, both factors
    /// fall back to the prior.
    pub fn get_authority(&self, user: &UserId, level: FeedbackLevel, domain: &str) -> f64 {
        let Some(record) = self.records.get(user) else {
            return self.config.prior;
        };

        let evidence = record.levels.get(&level).map(|le| {
            le.per_domain
                .get(domain)
                .filter(|e| e.total > 0)
                .unwrap_or(&le.overall)
        });

        let (track, recent) = match evidence {
            Some(e) => (
                e.track_record().unwrap_or(self.config.prior),
                e.recent_performance().unwrap_or(self.config.prior),
            ),
            None => (self.config.prior, self.config.prior),
        };

        let authority = self.config.baseline_share * record.baseline_credential
            + self.config.track_record_share * track
            + self.config.recent_share * recent;
        authority.clamp(0.0, 1.0)
    }

    /// Apply a consensus outcome for one of the user's past feedback
    /// events. Runs when consensus is established, which may be long
    /// after ingestion; callers queue these asynchronously.
    pub fn update_from_feedback(
        &self,
        user: &UserId,
        level: FeedbackLevel,
        domain: &str,
        outcome: ValidationOutcome,
    ) {
        let confirmed = outcome == ValidationOutcome::Confirmed;
        let window = self.config.recent_window;

        let mut record = self
            .records
            .entry(user.clone())
            .or_insert_with(|| UserAuthority::new(user.clone(), self.config.prior));

        let level_evidence = record.levels.entry(level).or_default();
        level_evidence.overall.record(confirmed, window);
        level_evidence
            .per_domain
            .entry(domain.to_string())
            .or_insert_with(AuthorityEvidence::default)
            .record(confirmed, window);
        record.updated_at = chrono::Utc::now();

        debug!(user = %user, %level, domain, confirmed, "authority evidence recorded");
    }

    /// Read-only snapshot of one user's record, for observability and
    /// persistence.
    pub fn get_record(&self, user: &UserId) -> Option<UserAuthority> {
        self.records.get(user).map(|r| r.clone())
    }

    /// All records, for persistence.
    pub fn all_records(&self) -> Vec<UserAuthority> {
        self.records.iter().map(|r| r.clone()).collect()
    }

    /// Restore a persisted record at bootstrap.
    pub fn restore(&self, record: UserAuthority) {
        self.records.insert(record.user_id.clone(), record);
    }
}
