//! StorageEngine: owns the writer connection, runs migrations at open,
//! and exposes batch save/load entry points per table family.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::info;

use plexus_authority::UserAuthority;
use plexus_core::errors::{PlexusResult, StorageError};
use plexus_core::types::{
    BridgeMapping, ParameterChange, ParameterSnapshot, RelationType, StrategyId, Weight,
};

use crate::queries::{authority_ops, bridge_ops, log_ops, param_ops};
use crate::schema;

/// Everything the parameter store needs to resume from disk.
#[derive(Debug, Default)]
pub struct PersistedParameters {
    pub traversals: Vec<(StrategyId, RelationType, Weight, DateTime<Utc>)>,
    pub alphas: Vec<(StrategyId, Weight)>,
    pub gating_rows: Vec<(StrategyId, Vec<f64>, f64)>,
    pub rerank: Option<[f64; 4]>,
}

pub struct StorageEngine {
    conn: Mutex<Connection>,
}

impl StorageEngine {
    /// Open a file-backed database, creating tables as needed.
    pub fn open(path: &Path) -> PlexusResult<Self> {
        let conn = Connection::open(path).map_err(crate::db_err)?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(crate::db_err)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(crate::db_err)?;
        schema::run_migrations(&conn)?;
        info!(path = %path.display(), "storage opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database, for tests.
    pub fn open_in_memory() -> PlexusResult<Self> {
        let conn = Connection::open_in_memory().map_err(crate::db_err)?;
        schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> PlexusResult<T>,
    ) -> PlexusResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Database("writer lock poisoned".into()))?;
        f(&conn)
    }

    fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> PlexusResult<T>,
    ) -> PlexusResult<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StorageError::Database("writer lock poisoned".into()))?;
        let tx = conn.transaction().map_err(crate::db_err)?;
        let result = f(&tx)?;
        tx.commit().map_err(crate::db_err)?;
        Ok(result)
    }

    /// Persist the current parameter state: traversal weights with their
    /// last-update times plus the snapshot's alphas, gating, and rerank.
    pub fn save_parameters(
        &self,
        snapshot: &ParameterSnapshot,
        traversal_ages: &[(StrategyId, RelationType, Weight, DateTime<Utc>)],
    ) -> PlexusResult<()> {
        self.in_transaction(|conn| {
            for &(strategy, relation, weight, updated_at) in traversal_ages {
                param_ops::upsert_traversal(conn, strategy, relation, weight, updated_at)?;
            }
            for (&strategy, &alpha) in &snapshot.alphas {
                param_ops::upsert_alpha(conn, strategy, alpha, snapshot.taken_at)?;
            }
            for &strategy in &StrategyId::ALL {
                param_ops::upsert_gating_row(
                    conn,
                    strategy,
                    &snapshot.gating.rows[strategy.index()],
                    snapshot.gating.bias[strategy.index()],
                    snapshot.taken_at,
                )?;
            }
            param_ops::upsert_rerank(conn, &snapshot.rerank.weights, snapshot.taken_at)?;
            Ok(())
        })
    }

    /// Load whatever parameter state was persisted. Missing tables rows
    /// leave the corresponding priors in effect.
    pub fn load_parameters(&self) -> PlexusResult<PersistedParameters> {
        self.with_conn(|conn| {
            Ok(PersistedParameters {
                traversals: param_ops::load_traversals(conn)?,
                alphas: param_ops::load_alphas(conn)?,
                gating_rows: param_ops::load_gating_rows(conn)?,
                rerank: param_ops::load_rerank(conn)?,
            })
        })
    }

    pub fn save_bridge_mappings(&self, mappings: &[BridgeMapping]) -> PlexusResult<()> {
        self.in_transaction(|conn| {
            for mapping in mappings {
                bridge_ops::upsert_mapping(conn, mapping)?;
            }
            Ok(())
        })
    }

    pub fn load_bridge_mappings(&self) -> PlexusResult<Vec<BridgeMapping>> {
        self.with_conn(bridge_ops::load_mappings)
    }

    pub fn save_authority_records(&self, records: &[UserAuthority]) -> PlexusResult<()> {
        self.in_transaction(|conn| {
            for record in records {
                authority_ops::upsert_record(conn, record)?;
            }
            Ok(())
        })
    }

    pub fn load_authority_records(&self) -> PlexusResult<Vec<UserAuthority>> {
        self.with_conn(authority_ops::load_records)
    }

    /// Append drained change-log entries. The log is append-only; replay
    /// from a persisted snapshot reconstructs any later state.
    pub fn append_change_log(&self, changes: &[ParameterChange]) -> PlexusResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.in_transaction(|conn| log_ops::append_changes(conn, changes))
    }

    pub fn load_changes_after(&self, seq: i64) -> PlexusResult<Vec<ParameterChange>> {
        self.with_conn(|conn| log_ops::load_changes_after(conn, seq))
    }
}
