//! Weight schema & priors: static per-strategy default traversal weights
//! per relation type. The decay manager pulls unreinforced weights back
//! toward these values, and bootstrap initializes the parameter store
//! from them.

use std::collections::HashMap;

use crate::config::defaults::DEFAULT_ALPHA;
use crate::types::{
    GatingParameters, ParameterSnapshot, RelationType, RerankParameters, Strategy, StrategyId,
    Weight,
};

/// Default traversal weight for a (strategy, relation) pair.
///
/// Relations outside a strategy's emphasis get a conservative 0.3 rather
/// than 0, so an unreinforced system can still traverse them weakly.
pub fn prior_for(strategy: StrategyId, relation: RelationType) -> Weight {
    let value = match (strategy, relation) {
        // Semantic: definitional and referential structure.
        (StrategyId::Semantic, RelationType::Defines) => 0.9,
        (StrategyId::Semantic, RelationType::References) => 0.7,
        (StrategyId::Semantic, RelationType::Extends) => 0.6,

        // Structural: containment and extension.
        (StrategyId::Structural, RelationType::PartOf) => 0.9,
        (StrategyId::Structural, RelationType::Extends) => 0.8,
        (StrategyId::Structural, RelationType::Defines) => 0.6,

        // Causal: cause/effect chains.
        (StrategyId::Causal, RelationType::Causes) => 0.9,
        (StrategyId::Causal, RelationType::Follows) => 0.6,
        (StrategyId::Causal, RelationType::References) => 0.4,

        // Temporal: ordering.
        (StrategyId::Temporal, RelationType::Follows) => 0.9,
        (StrategyId::Temporal, RelationType::Causes) => 0.6,

        _ => 0.3,
    };
    Weight::new(value)
}

/// Relations each strategy is allowed to traverse.
pub fn allowed_relations(strategy: StrategyId) -> Vec<RelationType> {
    match strategy {
        StrategyId::Semantic => vec![
            RelationType::Defines,
            RelationType::References,
            RelationType::Extends,
        ],
        StrategyId::Structural => vec![
            RelationType::PartOf,
            RelationType::Extends,
            RelationType::Defines,
        ],
        StrategyId::Causal => vec![
            RelationType::Causes,
            RelationType::Follows,
            RelationType::References,
        ],
        StrategyId::Temporal => vec![RelationType::Follows, RelationType::Causes],
    }
}

/// Build one strategy from its priors.
pub fn default_strategy(id: StrategyId) -> Strategy {
    let allowed = allowed_relations(id);
    let traversal_weights: HashMap<RelationType, Weight> = allowed
        .iter()
        .map(|&relation| (relation, prior_for(id, relation)))
        .collect();
    Strategy {
        id,
        traversal_weights,
        allowed_relations: allowed,
    }
}

/// The full default strategy table, keyed by id.
pub fn default_strategies() -> HashMap<StrategyId, Strategy> {
    StrategyId::ALL
        .iter()
        .map(|&id| (id, default_strategy(id)))
        .collect()
}

/// Bootstrap snapshot: every parameter at its prior. Used at startup
/// before any persisted state is loaded, and by the decay manager as the
/// attractor weights are pulled back toward.
pub fn bootstrap_snapshot(embedding_dim: usize) -> ParameterSnapshot {
    ParameterSnapshot {
        strategies: default_strategies(),
        alphas: StrategyId::ALL
            .iter()
            .map(|&id| (id, Weight::new(DEFAULT_ALPHA)))
            .collect(),
        gating: GatingParameters::uniform(embedding_dim),
        rerank: RerankParameters::default(),
        version: 0,
        taken_at: chrono::Utc::now(),
    }
}
