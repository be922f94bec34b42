/// Bridge Index errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A mapping references a chunk that was never registered.
    #[error("unknown chunk: {0}")]
    UnknownChunk(String),

    /// A mapping references a graph node that was never registered.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// `update_weight` on a mapping that does not exist. Updates never
    /// silently create mappings.
    #[error("no mapping for chunk {chunk_id} -> node {node_id} ({relation})")]
    MappingNotFound {
        chunk_id: String,
        node_id: String,
        relation: String,
    },
}
