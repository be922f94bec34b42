//! Append-only parameter change log. Rows are never updated or deleted;
//! replaying them from any persisted snapshot reconstructs later state.

use rusqlite::{params, Connection};

use plexus_core::errors::{PlexusResult, StorageError};
use plexus_core::types::{ParamKey, ParameterChange};

use crate::{db_err, ser_err};

pub fn append_changes(conn: &Connection, changes: &[ParameterChange]) -> PlexusResult<()> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO parameter_change_log
                 (seq, timestamp, feedback_id, param_key, old_value, new_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(db_err)?;
    for change in changes {
        let key = serde_json::to_string(&change.key).map_err(ser_err)?;
        stmt.execute(params![
            change.seq as i64,
            change.timestamp.to_rfc3339(),
            change.feedback_id.as_ref().map(|id| id.as_str()),
            key,
            change.old_value.to_string(),
            change.new_value.to_string(),
        ])
        .map_err(db_err)?;
    }
    Ok(())
}

/// Load changes with `seq > after`, ordered by sequence.
pub fn load_changes_after(conn: &Connection, after: i64) -> PlexusResult<Vec<ParameterChange>> {
    let mut stmt = conn
        .prepare(
            "SELECT seq, timestamp, feedback_id, param_key, old_value, new_value
             FROM parameter_change_log WHERE seq > ?1 ORDER BY seq",
        )
        .map_err(db_err)?;
    let rows = stmt
        .query_map(params![after], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (seq, timestamp, feedback_id, key, old_value, new_value) = row.map_err(db_err)?;
        out.push(ParameterChange {
            seq: seq as u64,
            timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| StorageError::CorruptBlob {
                    key: "change_log.timestamp".into(),
                    reason: e.to_string(),
                })?
                .with_timezone(&chrono::Utc),
            feedback_id: feedback_id.map(Into::into),
            key: parse_key(&key)?,
            old_value: parse_json(&old_value)?,
            new_value: parse_json(&new_value)?,
        });
    }
    Ok(out)
}

fn parse_key(raw: &str) -> PlexusResult<ParamKey> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::CorruptBlob {
            key: "change_log.param_key".into(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn parse_json(raw: &str) -> PlexusResult<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::CorruptBlob {
            key: "change_log.value".into(),
            reason: e.to_string(),
        }
        .into()
    })
}
