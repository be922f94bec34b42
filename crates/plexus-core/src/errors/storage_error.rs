/// Persistence layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("corrupt parameter blob for {key}: {reason}")]
    CorruptBlob { key: String, reason: String },
}
