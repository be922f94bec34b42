/// Retrieval subsystem errors.
///
/// Per-strategy timeouts are recovered locally as partial results and are
/// deliberately not represented here; only a total failure across every
/// strategy surfaces to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("every strategy failed or timed out")]
    AllStrategiesFailed,

    #[error("query embedding is empty")]
    EmptyQueryEmbedding,

    #[error("unknown anchor node: {0}")]
    UnknownAnchor(String),

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },
}
