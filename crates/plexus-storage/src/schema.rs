//! Table definitions and migration runner.

use rusqlite::Connection;
use tracing::info;

use plexus_core::errors::PlexusResult;

use crate::db_err;

const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS traversal_weights (
    strategy    TEXT NOT NULL,
    relation    TEXT NOT NULL,
    weight      REAL NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (strategy, relation)
);

CREATE TABLE IF NOT EXISTS alpha_params (
    strategy    TEXT PRIMARY KEY,
    value       REAL NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gating_params (
    strategy    TEXT PRIMARY KEY,
    row         TEXT NOT NULL,
    bias        REAL NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rerank_params (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    weights     TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bridge_mappings (
    chunk_id    TEXT NOT NULL,
    node_id     TEXT NOT NULL,
    relation    TEXT NOT NULL,
    weight      REAL NOT NULL,
    confidence  REAL NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (chunk_id, node_id, relation)
);
CREATE INDEX IF NOT EXISTS idx_bridge_by_node ON bridge_mappings (node_id);

CREATE TABLE IF NOT EXISTS user_authority (
    user_id     TEXT PRIMARY KEY,
    record      TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS parameter_change_log (
    seq         INTEGER PRIMARY KEY,
    timestamp   TEXT NOT NULL,
    feedback_id TEXT,
    param_key   TEXT NOT NULL,
    old_value   TEXT NOT NULL,
    new_value   TEXT NOT NULL
);
";

/// Create all tables and stamp the schema version. Idempotent.
pub fn run_migrations(conn: &Connection) -> PlexusResult<()> {
    conn.execute_batch(CREATE_TABLES).map_err(db_err)?;

    let current: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(db_err)?;
    if current < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(db_err)?;
        info!(from = current, to = SCHEMA_VERSION, "schema migrated");
    }
    Ok(())
}
