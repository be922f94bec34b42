//! Bridge mapping persistence.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use plexus_core::errors::{PlexusResult, StorageError};
use plexus_core::types::{BridgeMapping, RelationType, Weight};

use crate::db_err;

pub fn upsert_mapping(conn: &Connection, mapping: &BridgeMapping) -> PlexusResult<()> {
    conn.execute(
        "INSERT INTO bridge_mappings
             (chunk_id, node_id, relation, weight, confidence, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (chunk_id, node_id, relation) DO UPDATE SET
             weight = excluded.weight,
             confidence = excluded.confidence,
             updated_at = excluded.updated_at",
        params![
            mapping.chunk_id.as_str(),
            mapping.node_id.as_str(),
            mapping.relation.as_str(),
            mapping.weight.value(),
            mapping.confidence.value(),
            mapping.created_at.to_rfc3339(),
            mapping.updated_at.to_rfc3339(),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_mappings(conn: &Connection) -> PlexusResult<Vec<BridgeMapping>> {
    let mut stmt = conn
        .prepare(
            "SELECT chunk_id, node_id, relation, weight, confidence, created_at, updated_at
             FROM bridge_mappings",
        )
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (chunk, node, relation, weight, confidence, created, updated) = row.map_err(db_err)?;
        out.push(BridgeMapping {
            chunk_id: chunk.into(),
            node_id: node.into(),
            relation: parse_relation(&relation)?,
            weight: Weight::new(weight),
            confidence: Weight::new(confidence),
            created_at: parse_timestamp(&created)?,
            updated_at: parse_timestamp(&updated)?,
        });
    }
    Ok(out)
}

fn parse_relation(raw: &str) -> PlexusResult<RelationType> {
    RelationType::from_str(raw).map_err(|reason| {
        StorageError::CorruptBlob {
            key: "bridge.relation".into(),
            reason,
        }
        .into()
    })
}

fn parse_timestamp(raw: &str) -> PlexusResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptBlob {
                key: "bridge.timestamp".into(),
                reason: e.to_string(),
            }
            .into()
        })
}
