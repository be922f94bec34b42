//! Parameter table CRUD: traversal weights, alphas, gating rows, rerank.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use plexus_core::errors::{PlexusResult, StorageError};
use plexus_core::types::{RelationType, StrategyId, Weight};

use crate::{db_err, ser_err};

pub fn upsert_traversal(
    conn: &Connection,
    strategy: StrategyId,
    relation: RelationType,
    weight: Weight,
    updated_at: DateTime<Utc>,
) -> PlexusResult<()> {
    conn.execute(
        "INSERT INTO traversal_weights (strategy, relation, weight, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (strategy, relation) DO UPDATE SET
             weight = excluded.weight, updated_at = excluded.updated_at",
        params![
            strategy.as_str(),
            relation.as_str(),
            weight.value(),
            updated_at.to_rfc3339(),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_traversals(
    conn: &Connection,
) -> PlexusResult<Vec<(StrategyId, RelationType, Weight, DateTime<Utc>)>> {
    let mut stmt = conn
        .prepare("SELECT strategy, relation, weight, updated_at FROM traversal_weights")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (strategy, relation, weight, updated_at) = row.map_err(db_err)?;
        out.push((
            parse_field::<StrategyId>(&strategy, "traversal.strategy")?,
            parse_field::<RelationType>(&relation, "traversal.relation")?,
            Weight::new(weight),
            parse_timestamp(&updated_at, "traversal.updated_at")?,
        ));
    }
    Ok(out)
}

pub fn upsert_alpha(
    conn: &Connection,
    strategy: StrategyId,
    value: Weight,
    updated_at: DateTime<Utc>,
) -> PlexusResult<()> {
    conn.execute(
        "INSERT INTO alpha_params (strategy, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (strategy) DO UPDATE SET
             value = excluded.value, updated_at = excluded.updated_at",
        params![strategy.as_str(), value.value(), updated_at.to_rfc3339()],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_alphas(conn: &Connection) -> PlexusResult<Vec<(StrategyId, Weight)>> {
    let mut stmt = conn
        .prepare("SELECT strategy, value FROM alpha_params")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (strategy, value) = row.map_err(db_err)?;
        out.push((
            parse_field::<StrategyId>(&strategy, "alpha.strategy")?,
            Weight::new(value),
        ));
    }
    Ok(out)
}

pub fn upsert_gating_row(
    conn: &Connection,
    strategy: StrategyId,
    weights: &[f64],
    bias: f64,
    updated_at: DateTime<Utc>,
) -> PlexusResult<()> {
    let row = serde_json::to_string(weights).map_err(ser_err)?;
    conn.execute(
        "INSERT INTO gating_params (strategy, row, bias, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (strategy) DO UPDATE SET
             row = excluded.row, bias = excluded.bias, updated_at = excluded.updated_at",
        params![strategy.as_str(), row, bias, updated_at.to_rfc3339()],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_gating_rows(conn: &Connection) -> PlexusResult<Vec<(StrategyId, Vec<f64>, f64)>> {
    let mut stmt = conn
        .prepare("SELECT strategy, row, bias FROM gating_params")
        .map_err(db_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })
        .map_err(db_err)?;

    let mut out = Vec::new();
    for row in rows {
        let (strategy, blob, bias) = row.map_err(db_err)?;
        let weights: Vec<f64> =
            serde_json::from_str(&blob).map_err(|e| StorageError::CorruptBlob {
                key: format!("gating/{strategy}"),
                reason: e.to_string(),
            })?;
        out.push((
            parse_field::<StrategyId>(&strategy, "gating.strategy")?,
            weights,
            bias,
        ));
    }
    Ok(out)
}

pub fn upsert_rerank(
    conn: &Connection,
    weights: &[f64; 4],
    updated_at: DateTime<Utc>,
) -> PlexusResult<()> {
    let blob = serde_json::to_string(weights.as_slice()).map_err(ser_err)?;
    conn.execute(
        "INSERT INTO rerank_params (id, weights, updated_at)
         VALUES (1, ?1, ?2)
         ON CONFLICT (id) DO UPDATE SET
             weights = excluded.weights, updated_at = excluded.updated_at",
        params![blob, updated_at.to_rfc3339()],
    )
    .map_err(db_err)?;
    Ok(())
}

pub fn load_rerank(conn: &Connection) -> PlexusResult<Option<[f64; 4]>> {
    let blob: Option<String> = conn
        .query_row("SELECT weights FROM rerank_params WHERE id = 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db_err)?;
    let Some(blob) = blob else {
        return Ok(None);
    };
    let weights: Vec<f64> = serde_json::from_str(&blob).map_err(|e| StorageError::CorruptBlob {
        key: "rerank".into(),
        reason: e.to_string(),
    })?;
    let arr: [f64; 4] = weights
        .try_into()
        .map_err(|v: Vec<f64>| StorageError::CorruptBlob {
            key: "rerank".into(),
            reason: format!("expected 4 weights, got {}", v.len()),
        })?;
    Ok(Some(arr))
}

fn parse_field<T: FromStr<Err = String>>(raw: &str, key: &str) -> PlexusResult<T> {
    T::from_str(raw).map_err(|reason| {
        StorageError::CorruptBlob {
            key: key.to_string(),
            reason,
        }
        .into()
    })
}

fn parse_timestamp(raw: &str, key: &str) -> PlexusResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptBlob {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
}
