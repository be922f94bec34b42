use serde::{Deserialize, Serialize};

use super::ids::NodeId;
use super::strategy::RelationType;

/// Type tag for a knowledge-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Concept,
    Entity,
    Event,
    Claim,
}

/// A typed directed edge to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub target: NodeId,
    pub relation: RelationType,
}

/// A knowledge-graph node. Structure is immutable and produced externally;
/// this core only reads it during traversal scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub node_type: NodeType,
    pub edges: Vec<GraphEdge>,
}

impl GraphNode {
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            edges: Vec::new(),
        }
    }

    pub fn with_edge(mut self, target: impl Into<NodeId>, relation: RelationType) -> Self {
        self.edges.push(GraphEdge {
            target: target.into(),
            relation,
        });
        self
    }
}
