//! # status-feed
//!
//! Fetches OVHcloud status feeds and parses incident titles into the
//! locations they affect.
//!
//! ```no_run
//! use status_feed::{title, FeedClient, FeedFetcher, FeedSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), status_feed::FeedError> {
//!     let client = FeedClient::new()?;
//!
//!     for source in FeedSource::defaults() {
//!         for incident in client.fetch(&source).await? {
//!             match title::classify(&incident.title) {
//!                 Ok(scope) => println!("{}: {:?}", incident.id, scope),
//!                 Err(e) => println!("{}: {}", incident.id, e),
//!             }
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod feed;
pub mod title;

pub use client::{FeedClient, FeedFetcher, FeedSource, BARE_METAL_FEED_URL, PUBLIC_CLOUD_FEED_URL};
pub use error::{FeedError, TitleError};
pub use feed::{parse_feed, Incident};
pub use title::{LocationToken, TitleScope};
