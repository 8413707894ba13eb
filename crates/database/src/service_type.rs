//! Service type operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ServiceType;

/// Get a service type by name.
pub async fn get_service_type_by_name(pool: &SqlitePool, name: &str) -> Result<ServiceType> {
    sqlx::query_as::<_, ServiceType>(
        r#"
        SELECT id, name
        FROM service_types
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "ServiceType",
        id: name.to_string(),
    })
}

/// List all service types.
pub async fn list_service_types(pool: &SqlitePool) -> Result<Vec<ServiceType>> {
    let service_types = sqlx::query_as::<_, ServiceType>(
        r#"
        SELECT id, name
        FROM service_types
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(service_types)
}
