/// Feedback-ingestion and parameter-update errors.
#[derive(Debug, thiserror::Error)]
pub enum LearningError {
    /// Feedback referencing a trace this core never produced.
    #[error("unknown trace: {0}")]
    UnknownTrace(String),

    /// Feedback against a trace that never completed.
    #[error("trace {0} did not complete")]
    IncompleteTrace(String),

    /// Malformed feedback: out-of-range score or invalid shape. Rejected
    /// outright, never partially applied.
    #[error("invalid judgment: {0}")]
    InvalidJudgment(String),

    /// Re-ingestion of an already-processed feedback id. Rewards are
    /// never double counted.
    #[error("feedback {0} already ingested")]
    DuplicateFeedback(String),

    /// Update addressed to a parameter key that does not exist.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Racing updates on the same parameter key exhausted their retries.
    /// The caller should re-submit; the update was not silently dropped.
    #[error("update conflict on {key} after {attempts} attempts")]
    UpdateConflict { key: String, attempts: u32 },
}
