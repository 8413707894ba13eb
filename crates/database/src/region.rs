//! Region operations.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DatabaseError, Result};
use crate::models::Region;
use crate::validation::{validate_name, MAX_REGION_LENGTH};

/// Get a region by name, creating it when absent.
///
/// Uses insert-or-ignore followed by a select, so concurrent callers never
/// produce duplicate rows.
pub async fn get_or_create_region(pool: &SqlitePool, name: &str) -> Result<Region> {
    if let Some(region) = find_region(pool, name).await? {
        return Ok(region);
    }

    validate_name("region", name, MAX_REGION_LENGTH)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO regions (name)
        VALUES (?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Region", name))?;

    if inserted.rows_affected() > 0 {
        debug!(region = %name, "Created region");
    }

    find_region(pool, name)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Region",
            id: name.to_string(),
        })
}

/// Find a region by exact name.
pub async fn find_region(pool: &SqlitePool, name: &str) -> Result<Option<Region>> {
    let region = sqlx::query_as::<_, Region>(
        r#"
        SELECT id, name
        FROM regions
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(region)
}

/// Get a region by ID.
pub async fn get_region(pool: &SqlitePool, id: i64) -> Result<Region> {
    sqlx::query_as::<_, Region>(
        r#"
        SELECT id, name
        FROM regions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Region",
        id: id.to_string(),
    })
}

/// List all regions.
pub async fn list_regions(pool: &SqlitePool) -> Result<Vec<Region>> {
    let regions = sqlx::query_as::<_, Region>(
        r#"
        SELECT id, name
        FROM regions
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(regions)
}
