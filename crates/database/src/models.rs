//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A geographic region, identified by its code (e.g. "FRA", "SBG").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Region {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Region code.
    pub name: String,
}

/// A datacenter inside a region. Its code starts with the region code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Datacenter {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Datacenter code (e.g. "SBG5").
    pub name: String,
    /// Owning region.
    pub region_id: i64,
}

/// A rack inside a datacenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Rack {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Rack label as it appears in incident titles (e.g. "A12").
    pub name: String,
    /// Owning datacenter.
    pub datacenter_id: i64,
}

/// Classifier for the product line a tracker follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ServiceType {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Service type name (e.g. "bare-metal-servers").
    pub name: String,
}

/// A webhook subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tracker {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Endpoint that receives notifications.
    pub webhook_url: String,
    /// Service type this tracker follows.
    pub service_type_id: i64,
    /// Region scope, if region-scoped.
    pub region_id: Option<i64>,
    /// Datacenter scope, if datacenter-scoped.
    pub datacenter_id: Option<i64>,
    /// Rack scope, if rack-scoped.
    pub rack_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
}

impl Tracker {
    /// The hierarchy level this tracker is scoped to.
    pub fn scope(&self) -> TrackerScope {
        match (self.region_id, self.datacenter_id, self.rack_id) {
            (_, _, Some(id)) => TrackerScope::Rack(id),
            (_, Some(id), _) => TrackerScope::Datacenter(id),
            (Some(id), _, _) => TrackerScope::Region(id),
            _ => TrackerScope::Global,
        }
    }
}

/// The single hierarchy level a tracker listens to.
///
/// Serialized as `{"level": "region", "id": 3}`, or `{"level": "global"}` for
/// trackers that receive every incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "id", rename_all = "snake_case")]
pub enum TrackerScope {
    Global,
    Region(i64),
    Datacenter(i64),
    Rack(i64),
}

impl TrackerScope {
    /// Column values as `(region_id, datacenter_id, rack_id)`.
    pub fn columns(&self) -> (Option<i64>, Option<i64>, Option<i64>) {
        match *self {
            TrackerScope::Global => (None, None, None),
            TrackerScope::Region(id) => (Some(id), None, None),
            TrackerScope::Datacenter(id) => (None, Some(id), None),
            TrackerScope::Rack(id) => (None, None, Some(id)),
        }
    }
}

/// Fields required to create or replace a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTracker {
    /// Endpoint that receives notifications.
    pub webhook_url: String,
    /// Service type this tracker follows.
    pub service_type_id: i64,
    /// Hierarchy scope.
    pub scope: TrackerScope,
}
