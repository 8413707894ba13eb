//! Rack operations.
//!
//! Racks are never created by the poll loop; they are registered up front so
//! incident titles can be matched against them.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Rack;
use crate::validation::{validate_name, MAX_RACK_LENGTH};

/// Register a rack in a datacenter.
pub async fn create_rack(pool: &SqlitePool, name: &str, datacenter_id: i64) -> Result<Rack> {
    validate_name("rack", name, MAX_RACK_LENGTH)?;

    let result = sqlx::query(
        r#"
        INSERT INTO racks (name, datacenter_id)
        VALUES (?, ?)
        "#,
    )
    .bind(name)
    .bind(datacenter_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Rack", name))?;

    Ok(Rack {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        datacenter_id,
    })
}

/// Find a rack by exact name.
///
/// When several datacenters hold a rack with the same name, the oldest one wins.
pub async fn find_rack(pool: &SqlitePool, label: &str) -> Result<Option<Rack>> {
    let rack = sqlx::query_as::<_, Rack>(
        r#"
        SELECT id, name, datacenter_id
        FROM racks
        WHERE name = ?
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(label)
    .fetch_optional(pool)
    .await?;

    Ok(rack)
}

/// List the racks of a datacenter.
pub async fn list_racks_in_datacenter(pool: &SqlitePool, datacenter_id: i64) -> Result<Vec<Rack>> {
    let racks = sqlx::query_as::<_, Rack>(
        r#"
        SELECT id, name, datacenter_id
        FROM racks
        WHERE datacenter_id = ?
        ORDER BY id
        "#,
    )
    .bind(datacenter_id)
    .fetch_all(pool)
    .await?;

    Ok(racks)
}

/// List all racks.
pub async fn list_racks(pool: &SqlitePool) -> Result<Vec<Rack>> {
    let racks = sqlx::query_as::<_, Rack>(
        r#"
        SELECT id, name, datacenter_id
        FROM racks
        ORDER BY datacenter_id, name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(racks)
}
