//! Error taxonomy for the workspace. Per-subsystem enums plus the umbrella
//! `PlexusError` every crate returns through `PlexusResult`.

mod bridge_error;
mod learning_error;
mod retrieval_error;
mod storage_error;

pub use bridge_error::BridgeError;
pub use learning_error::LearningError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;

/// Umbrella error for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum PlexusError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Learning(#[from] LearningError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the workspace.
pub type PlexusResult<T> = Result<T, PlexusError>;
