use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::weight::Weight;

/// Typed directed relationship between graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Defines,
    References,
    Extends,
    Causes,
    PartOf,
    Follows,
}

impl RelationType {
    pub const ALL: [RelationType; 6] = [
        RelationType::Defines,
        RelationType::References,
        RelationType::Extends,
        RelationType::Causes,
        RelationType::PartOf,
        RelationType::Follows,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Defines => "defines",
            RelationType::References => "references",
            RelationType::Extends => "extends",
            RelationType::Causes => "causes",
            RelationType::PartOf => "part_of",
            RelationType::Follows => "follows",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defines" => Ok(RelationType::Defines),
            "references" => Ok(RelationType::References),
            "extends" => Ok(RelationType::Extends),
            "causes" => Ok(RelationType::Causes),
            "part_of" => Ok(RelationType::PartOf),
            "follows" => Ok(RelationType::Follows),
            other => Err(format!("unknown relation type: {other}")),
        }
    }
}

/// The fixed set of retrieval strategies. Each strategy carries its own
/// traversal weight vector and a declarative allowed-relation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Semantic,
    Structural,
    Causal,
    Temporal,
}

impl StrategyId {
    pub const ALL: [StrategyId; 4] = [
        StrategyId::Semantic,
        StrategyId::Structural,
        StrategyId::Causal,
        StrategyId::Temporal,
    ];

    /// Number of strategies in the fixed set. The gating network output
    /// has exactly this many entries.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this strategy in `ALL` (and in gating vectors).
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::Semantic => "semantic",
            StrategyId::Structural => "structural",
            StrategyId::Causal => "causal",
            StrategyId::Temporal => "temporal",
        }
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "semantic" => Ok(StrategyId::Semantic),
            "structural" => Ok(StrategyId::Structural),
            "causal" => Ok(StrategyId::Causal),
            "temporal" => Ok(StrategyId::Temporal),
            other => Err(format!("unknown strategy: {other}")),
        }
    }
}

/// A retrieval strategy: its identity, learned per-relation traversal
/// weights, and the relation types it is allowed to traverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub traversal_weights: HashMap<RelationType, Weight>,
    pub allowed_relations: Vec<RelationType>,
}

impl Strategy {
    /// Traversal weight for a relation, or `None` if the relation is not
    /// in this strategy's allowed list.
    pub fn traversal_weight(&self, relation: RelationType) -> Option<Weight> {
        if !self.allowed_relations.contains(&relation) {
            return None;
        }
        Some(
            self.traversal_weights
                .get(&relation)
                .copied()
                .unwrap_or_default(),
        )
    }
}
