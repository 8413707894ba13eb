//! Error types for incident processing.

use database::DatabaseError;
use status_feed::TitleError;
use thiserror::Error;

/// Errors that abandon a single incident.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The incident title could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] TitleError),

    /// The hierarchy could not be read or updated.
    #[error("reconciliation error: {0}")]
    Reconciliation(#[from] DatabaseError),
}

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;
