//! # watcher
//!
//! Turns status feed incidents into webhook notifications: titles are parsed
//! into locations, reconciled against the stored hierarchy, deduplicated and
//! fanned out to the trackers of every affected node.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use broadcaster::Broadcaster;
//! use database::Database;
//! use status_feed::FeedClient;
//! use tokio_util::sync::CancellationToken;
//! use watcher::{DedupeIndex, PollConfig, PollLoop};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:status-watcher.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let poll_loop = PollLoop::new(
//!         db,
//!         FeedClient::new()?,
//!         Broadcaster::new()?,
//!         Arc::new(DedupeIndex::new()),
//!         PollConfig::default(),
//!     );
//!
//!     poll_loop.run(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```

pub mod dedupe;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod store;

pub use dedupe::{incident_key, DedupeIndex, DEFAULT_DEDUPE_CAPACITY};
pub use dispatcher::{DispatchReport, Dispatcher, NotificationTarget};
pub use error::{Result, WatcherError};
pub use poller::{CycleSummary, IncidentOutcome, PollConfig, PollLoop, PollState};
pub use store::{EntityStore, Reconciled};
