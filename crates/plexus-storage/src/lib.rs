//! # plexus-storage
//!
//! SQLite persistence. Parameters, bridge mappings, and authority records
//! are written through the engine's single writer connection; the change
//! log is append-only so any parameter state can be reconstructed by
//! replay.

pub mod engine;
pub mod queries;
pub mod schema;

pub use engine::StorageEngine;

use plexus_core::errors::StorageError;

pub(crate) fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

pub(crate) fn ser_err(e: serde_json::Error) -> StorageError {
    StorageError::Serialization(e.to_string())
}
