//! SQLite persistence layer for the OVH status watcher.
//!
//! This crate stores the infrastructure hierarchy (regions, datacenters,
//! racks) and the webhook trackers subscribed to it, using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{datacenter, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:status-watcher.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Resolve a datacenter, creating it and its region on first sight
//!     let sbg5 = datacenter::get_or_create_datacenter(db.pool(), "SBG5", "SBG").await?;
//!     println!("SBG5 has id {}", sbg5.id);
//!
//!     Ok(())
//! }
//! ```

pub mod datacenter;
pub mod error;
pub mod models;
pub mod rack;
pub mod region;
pub mod service_type;
pub mod tracker;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{Datacenter, NewTracker, Rack, Region, ServiceType, Tracker, TrackerScope};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// The poll loop and the HTTP surface share the pool.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/status-watcher.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_or_create_region_is_idempotent() {
        let db = test_db().await;

        let first = region::get_or_create_region(db.pool(), "FRA").await.unwrap();
        let second = region::get_or_create_region(db.pool(), "FRA").await.unwrap();
        assert_eq!(first, second);

        let regions = region::list_regions(db.pool()).await.unwrap();
        assert_eq!(regions.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_create_datacenter_is_idempotent() {
        let db = test_db().await;

        let first = datacenter::get_or_create_datacenter(db.pool(), "SBG5", "SBG")
            .await
            .unwrap();
        let second = datacenter::get_or_create_datacenter(db.pool(), "SBG5", "SBG")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let datacenters = datacenter::list_datacenters(db.pool()).await.unwrap();
        assert_eq!(datacenters.len(), 1);

        // The region was created alongside the datacenter
        let sbg = region::get_region(db.pool(), first.region_id).await.unwrap();
        assert_eq!(sbg.name, "SBG");
    }

    #[tokio::test]
    async fn test_datacenter_name_too_long() {
        let db = test_db().await;

        let result =
            datacenter::get_or_create_datacenter(db.pool(), "SBG5-EXTENDED", "SBG").await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_find_rack() {
        let db = test_db().await;
        let sbg5 = datacenter::get_or_create_datacenter(db.pool(), "SBG5", "SBG")
            .await
            .unwrap();

        assert!(rack::find_rack(db.pool(), "A12").await.unwrap().is_none());

        let created = rack::create_rack(db.pool(), "A12", sbg5.id).await.unwrap();
        let found = rack::find_rack(db.pool(), "A12").await.unwrap().unwrap();
        assert_eq!(created, found);

        // Same name twice in one datacenter is rejected
        let duplicate = rack::create_rack(db.pool(), "A12", sbg5.id).await;
        assert!(matches!(duplicate, Err(DatabaseError::AlreadyExists { .. })));

        let racks = rack::list_racks_in_datacenter(db.pool(), sbg5.id).await.unwrap();
        assert_eq!(racks.len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_service_types() {
        let db = test_db().await;

        let names: Vec<String> = service_type::list_service_types(db.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["bare-metal-servers", "public-cloud"]);
    }

    #[tokio::test]
    async fn test_tracker_crud() {
        let db = test_db().await;
        let bare_metal = service_type::get_service_type_by_name(db.pool(), "bare-metal-servers")
            .await
            .unwrap();
        let fra = region::get_or_create_region(db.pool(), "FRA").await.unwrap();

        // Create
        let new_tracker = NewTracker {
            webhook_url: "https://discord.com/api/webhooks/1/abc".to_string(),
            service_type_id: bare_metal.id,
            scope: TrackerScope::Region(fra.id),
        };
        let created = tracker::create_tracker(db.pool(), &new_tracker).await.unwrap();
        assert_eq!(created.scope(), TrackerScope::Region(fra.id));

        // Read
        let fetched = tracker::get_tracker(db.pool(), created.id).await.unwrap();
        assert_eq!(fetched.webhook_url, new_tracker.webhook_url);

        // Update
        let updated = NewTracker {
            scope: TrackerScope::Global,
            ..new_tracker.clone()
        };
        let fetched = tracker::update_tracker(db.pool(), created.id, &updated)
            .await
            .unwrap();
        assert_eq!(fetched.scope(), TrackerScope::Global);

        // List
        let trackers = tracker::list_trackers(db.pool()).await.unwrap();
        assert_eq!(trackers.len(), 1);

        // Delete
        tracker::delete_tracker(db.pool(), created.id).await.unwrap();
        let result = tracker::get_tracker(db.pool(), created.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_tracker_with_missing_service_type() {
        let db = test_db().await;

        let result = tracker::create_tracker(
            db.pool(),
            &NewTracker {
                webhook_url: "https://example.com/hook".to_string(),
                service_type_id: 999,
                scope: TrackerScope::Global,
            },
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_trackers_for_scope() {
        let db = test_db().await;
        let bare_metal = service_type::get_service_type_by_name(db.pool(), "bare-metal-servers")
            .await
            .unwrap();
        let cloud = service_type::get_service_type_by_name(db.pool(), "public-cloud")
            .await
            .unwrap();
        let sbg5 = datacenter::get_or_create_datacenter(db.pool(), "SBG5", "SBG")
            .await
            .unwrap();

        for (url, service_type_id, scope) in [
            ("https://example.com/a", bare_metal.id, TrackerScope::Datacenter(sbg5.id)),
            ("https://example.com/b", cloud.id, TrackerScope::Datacenter(sbg5.id)),
            ("https://example.com/c", bare_metal.id, TrackerScope::Region(sbg5.region_id)),
            ("https://example.com/d", bare_metal.id, TrackerScope::Global),
        ] {
            tracker::create_tracker(
                db.pool(),
                &NewTracker {
                    webhook_url: url.to_string(),
                    service_type_id,
                    scope,
                },
            )
            .await
            .unwrap();
        }

        let all = tracker::trackers_for_scope(db.pool(), TrackerScope::Datacenter(sbg5.id), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let filtered = tracker::trackers_for_scope(
            db.pool(),
            TrackerScope::Datacenter(sbg5.id),
            Some("public-cloud"),
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].webhook_url, "https://example.com/b");

        let global = tracker::trackers_for_scope(db.pool(), TrackerScope::Global, None)
            .await
            .unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].webhook_url, "https://example.com/d");
    }
}
