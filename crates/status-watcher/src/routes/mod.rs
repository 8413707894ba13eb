//! Route handlers for the tracker API.

pub mod health;
pub mod hierarchy;
pub mod trackers;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Trackers
        .route(
            "/api/trackers",
            get(trackers::list_trackers).post(trackers::create_tracker),
        )
        .route(
            "/api/trackers/:id",
            get(trackers::get_tracker)
                .put(trackers::update_tracker)
                .delete(trackers::delete_tracker),
        )
        // Hierarchy
        .route("/api/regions", get(hierarchy::list_regions))
        .route("/api/datacenters", get(hierarchy::list_datacenters))
        .route(
            "/api/racks",
            get(hierarchy::list_racks).post(hierarchy::create_rack),
        )
        .route("/api/service-types", get(hierarchy::list_service_types))
}
