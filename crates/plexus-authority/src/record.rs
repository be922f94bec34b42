use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plexus_core::types::{FeedbackLevel, UserId};

/// Consensus-validated evidence for one (level, domain) scope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorityEvidence {
    /// Feedback events later confirmed by consensus.
    pub confirmed: u64,
    /// All consensus-resolved feedback events.
    pub total: u64,
    /// Outcomes of the most recent resolved events, oldest first.
    pub recent: VecDeque<bool>,
}

impl AuthorityEvidence {
    /// Lifetime confirmed fraction, or `None` with no history.
    pub fn track_record(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.confirmed as f64 / self.total as f64)
    }

    /// Accuracy over the recent window, or `None` with no history.
    pub fn recent_performance(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        let correct = self.recent.iter().filter(|&&b| b).count();
        Some(correct as f64 / self.recent.len() as f64)
    }

    pub fn record(&mut self, confirmed: bool, window: usize) {
        self.total += 1;
        if confirmed {
            self.confirmed += 1;
        }
        self.recent.push_back(confirmed);
        while self.recent.len() > window {
            self.recent.pop_front();
        }
    }
}

/// Per-level evidence: level-wide plus a per-domain breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelEvidence {
    pub overall: AuthorityEvidence,
    pub per_domain: HashMap<String, AuthorityEvidence>,
}

/// One user's authority state. Created on first resolved feedback,
/// updated thereafter, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAuthority {
    pub user_id: UserId,
    /// Externally assigned credential in [0,1]; neutral until set.
    pub baseline_credential: f64,
    pub levels: HashMap<FeedbackLevel, LevelEvidence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAuthority {
    pub fn new(user_id: UserId, baseline_credential: f64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            baseline_credential: baseline_credential.clamp(0.0, 1.0),
            levels: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
