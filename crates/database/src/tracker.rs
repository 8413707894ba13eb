//! Tracker (webhook subscription) operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewTracker, Tracker, TrackerScope};
use crate::validation::validate_webhook_url;

/// Create a new tracker.
pub async fn create_tracker(pool: &SqlitePool, tracker: &NewTracker) -> Result<Tracker> {
    validate_webhook_url(&tracker.webhook_url)?;
    let (region_id, datacenter_id, rack_id) = tracker.scope.columns();

    let result = sqlx::query(
        r#"
        INSERT INTO trackers (webhook_url, service_type_id, region_id, datacenter_id, rack_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tracker.webhook_url)
    .bind(tracker.service_type_id)
    .bind(region_id)
    .bind(datacenter_id)
    .bind(rack_id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Tracker", &tracker.webhook_url))?;

    get_tracker(pool, result.last_insert_rowid()).await
}

/// Get a tracker by ID.
pub async fn get_tracker(pool: &SqlitePool, id: i64) -> Result<Tracker> {
    sqlx::query_as::<_, Tracker>(
        r#"
        SELECT id, webhook_url, service_type_id, region_id, datacenter_id, rack_id, created_at
        FROM trackers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Tracker",
        id: id.to_string(),
    })
}

/// Replace the endpoint, service type and scope of a tracker.
pub async fn update_tracker(pool: &SqlitePool, id: i64, tracker: &NewTracker) -> Result<Tracker> {
    validate_webhook_url(&tracker.webhook_url)?;
    let (region_id, datacenter_id, rack_id) = tracker.scope.columns();

    let result = sqlx::query(
        r#"
        UPDATE trackers
        SET webhook_url = ?, service_type_id = ?, region_id = ?, datacenter_id = ?, rack_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&tracker.webhook_url)
    .bind(tracker.service_type_id)
    .bind(region_id)
    .bind(datacenter_id)
    .bind(rack_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Tracker", id.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Tracker",
            id: id.to_string(),
        });
    }

    get_tracker(pool, id).await
}

/// Delete a tracker by ID.
pub async fn delete_tracker(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM trackers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Tracker",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List all trackers.
pub async fn list_trackers(pool: &SqlitePool) -> Result<Vec<Tracker>> {
    let trackers = sqlx::query_as::<_, Tracker>(
        r#"
        SELECT id, webhook_url, service_type_id, region_id, datacenter_id, rack_id, created_at
        FROM trackers
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(trackers)
}

/// List the trackers subscribed to exactly this scope, in creation order.
///
/// When `service_type` is set, only trackers of that service type are returned.
pub async fn trackers_for_scope(
    pool: &SqlitePool,
    scope: TrackerScope,
    service_type: Option<&str>,
) -> Result<Vec<Tracker>> {
    let (column, id) = match scope {
        TrackerScope::Global => (None, None),
        TrackerScope::Region(id) => (Some("t.region_id"), Some(id)),
        TrackerScope::Datacenter(id) => (Some("t.datacenter_id"), Some(id)),
        TrackerScope::Rack(id) => (Some("t.rack_id"), Some(id)),
    };

    let scope_clause = match column {
        Some(column) => format!("{} = ?", column),
        None => "t.region_id IS NULL AND t.datacenter_id IS NULL AND t.rack_id IS NULL".to_string(),
    };

    let sql = format!(
        r#"
        SELECT t.id, t.webhook_url, t.service_type_id, t.region_id, t.datacenter_id, t.rack_id, t.created_at
        FROM trackers t
        INNER JOIN service_types s ON s.id = t.service_type_id
        WHERE {} AND (? IS NULL OR s.name = ?)
        ORDER BY t.id
        "#,
        scope_clause
    );

    let mut query = sqlx::query_as::<_, Tracker>(&sql);
    if let Some(id) = id {
        query = query.bind(id);
    }

    let trackers = query
        .bind(service_type)
        .bind(service_type)
        .fetch_all(pool)
        .await?;

    Ok(trackers)
}
