//! Workspace configuration. Every subsystem config derives serde with
//! `#[serde(default)]` so a partial TOML file overrides only what it names.

mod authority_config;
mod decay_config;
mod learning_config;
mod retrieval_config;

pub mod defaults;

pub use authority_config::AuthorityConfig;
pub use decay_config::DecayConfig;
pub use learning_config::LearningConfig;
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{PlexusError, PlexusResult};

/// Umbrella configuration for the whole system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlexusConfig {
    pub retrieval: RetrievalConfig,
    pub learning: LearningConfig,
    pub authority: AuthorityConfig,
    pub decay: DecayConfig,
}

impl PlexusConfig {
    /// Parse from a TOML string, then validate.
    pub fn from_toml(s: &str) -> PlexusResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| PlexusError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that would violate the numeric invariants.
    pub fn validate(&self) -> PlexusResult<()> {
        self.retrieval.validate()?;
        self.learning.validate()?;
        self.authority.validate()?;
        self.decay.validate()?;
        Ok(())
    }
}
