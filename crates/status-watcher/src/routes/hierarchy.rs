//! Region, datacenter, rack and service type routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use database::{datacenter, rack, region, service_type, Datacenter, Rack, Region, ServiceType};
use serde::Deserialize;
use tracing::info;
use watcher::EntityStore;

use crate::error::Result;
use crate::state::AppState;

/// Request to create a rack.
#[derive(Deserialize)]
pub struct NewRack {
    pub name: String,
    /// Datacenter code, created on demand.
    pub datacenter: String,
}

pub async fn list_regions(State(state): State<AppState>) -> Result<Json<Vec<Region>>> {
    Ok(Json(region::list_regions(state.db.pool()).await?))
}

pub async fn list_datacenters(State(state): State<AppState>) -> Result<Json<Vec<Datacenter>>> {
    Ok(Json(datacenter::list_datacenters(state.db.pool()).await?))
}

pub async fn list_racks(State(state): State<AppState>) -> Result<Json<Vec<Rack>>> {
    Ok(Json(rack::list_racks(state.db.pool()).await?))
}

pub async fn list_service_types(State(state): State<AppState>) -> Result<Json<Vec<ServiceType>>> {
    Ok(Json(service_type::list_service_types(state.db.pool()).await?))
}

/// Create a rack in a datacenter, creating the datacenter and its region if needed.
pub async fn create_rack(
    State(state): State<AppState>,
    Json(request): Json<NewRack>,
) -> Result<(StatusCode, Json<Rack>)> {
    let store = EntityStore::new(state.db.clone());
    let datacenter = store.get_or_create_datacenter(request.datacenter.trim()).await?;
    let created = rack::create_rack(state.db.pool(), request.name.trim(), datacenter.id).await?;

    info!(rack = %created.name, datacenter = %datacenter.name, "Created rack");
    Ok((StatusCode::CREATED, Json(created)))
}
