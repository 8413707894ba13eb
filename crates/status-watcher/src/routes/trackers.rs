//! Tracker routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{tracker, NewTracker, Tracker};
use tracing::info;

use crate::error::Result;
use crate::state::AppState;

/// List all trackers.
pub async fn list_trackers(State(state): State<AppState>) -> Result<Json<Vec<Tracker>>> {
    Ok(Json(tracker::list_trackers(state.db.pool()).await?))
}

/// Get one tracker.
pub async fn get_tracker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tracker>> {
    Ok(Json(tracker::get_tracker(state.db.pool(), id).await?))
}

/// Create a tracker.
pub async fn create_tracker(
    State(state): State<AppState>,
    Json(request): Json<NewTracker>,
) -> Result<(StatusCode, Json<Tracker>)> {
    let created = tracker::create_tracker(state.db.pool(), &request).await?;
    info!(tracker = created.id, scope = ?created.scope(), "Created tracker");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a tracker's endpoint, service type and scope.
pub async fn update_tracker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<NewTracker>,
) -> Result<Json<Tracker>> {
    let updated = tracker::update_tracker(state.db.pool(), id, &request).await?;
    info!(tracker = id, scope = ?updated.scope(), "Updated tracker");

    Ok(Json(updated))
}

/// Delete a tracker.
pub async fn delete_tracker(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    tracker::delete_tracker(state.db.pool(), id).await?;
    info!(tracker = id, "Deleted tracker");

    Ok(StatusCode::NO_CONTENT)
}
