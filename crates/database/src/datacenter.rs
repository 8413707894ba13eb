//! Datacenter operations.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::Datacenter;
use crate::region::get_or_create_region;
use crate::validation::{validate_name, MAX_DATACENTER_LENGTH};

/// Get a datacenter by code, creating it (and its region) when absent.
///
/// `region_name` is only used when the datacenter does not exist yet; an
/// existing datacenter keeps the region it was created with.
pub async fn get_or_create_datacenter(
    pool: &SqlitePool,
    code: &str,
    region_name: &str,
) -> Result<Datacenter> {
    if let Some(datacenter) = find_datacenter(pool, code).await? {
        return Ok(datacenter);
    }

    validate_name("datacenter", code, MAX_DATACENTER_LENGTH)?;
    let region = get_or_create_region(pool, region_name).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO datacenters (name, region_id)
        VALUES (?, ?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(code)
    .bind(region.id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Datacenter", code))?;

    if inserted.rows_affected() > 0 {
        debug!(datacenter = %code, region = %region.name, "Created datacenter");
    }

    find_datacenter(pool, code)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Datacenter",
            id: code.to_string(),
        })
}

/// Find a datacenter by exact code.
pub async fn find_datacenter(pool: &SqlitePool, code: &str) -> Result<Option<Datacenter>> {
    let datacenter = sqlx::query_as::<_, Datacenter>(
        r#"
        SELECT id, name, region_id
        FROM datacenters
        WHERE name = ?
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(datacenter)
}

/// List all datacenters.
pub async fn list_datacenters(pool: &SqlitePool) -> Result<Vec<Datacenter>> {
    let datacenters = sqlx::query_as::<_, Datacenter>(
        r#"
        SELECT id, name, region_id
        FROM datacenters
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(datacenters)
}
