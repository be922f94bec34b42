//! Authority record persistence. Records are small and deeply nested, so
//! they are stored as one JSON document per user.

use rusqlite::{params, Connection};

use plexus_authority::UserAuthority;
use plexus_core::errors::{PlexusResult, StorageError};

use crate::{db_err, ser_err};

pub fn upsert_record(conn: &Connection, record: &UserAuthority) -> PlexusResult<()> {
    let body = serde_json::to_string(record).map_err(ser_err)?;
    conn.execute(
        "INSERT INTO user_authority (user_id, record, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (user_id) DO UPDATE SET
             record = excluded.record, updated_at = excluded.updated_at",
        params![
            record.user_id.as_str(),
            body,
            record.updated_at.to_rfc3339(),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_records(conn: &Connection) -> PlexusResult<Vec<UserAuthority>> {
    let mut stmt = conn
        .prepare("SELECT user_id, record FROM user_authority")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (user_id, body) = row.map_err(db_err)?;
        let record: UserAuthority =
            serde_json::from_str(&body).map_err(|e| StorageError::CorruptBlob {
                key: format!("authority/{user_id}"),
                reason: e.to_string(),
            })?;
        out.push(record);
    }
    Ok(out)
}
