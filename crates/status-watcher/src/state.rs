//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use watcher::DedupeIndex;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Incidents already notified by the poll loop.
    pub dedupe: Arc<DedupeIndex>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, dedupe: Arc<DedupeIndex>) -> Self {
        Self { db, dedupe }
    }
}
