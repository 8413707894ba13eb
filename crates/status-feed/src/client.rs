//! Feed sources and the HTTP client that fetches them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeedError;
use crate::feed::{parse_feed, Incident};

/// Bare metal servers incident history.
pub const BARE_METAL_FEED_URL: &str = "https://bare-metal-servers.status-ovhcloud.com/history.rss";

/// Public cloud incident history.
pub const PUBLIC_CLOUD_FEED_URL: &str = "https://public-cloud.status-ovhcloud.com/history.rss";

/// A feed polled by the watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    /// Short name used in logs (e.g. "bare-metal-servers").
    pub name: String,
    /// Feed URL.
    pub url: String,
    /// Restrict notifications to trackers of this service type.
    pub service_type: Option<String>,
}

impl FeedSource {
    /// Create a source that notifies trackers of every service type.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            service_type: None,
        }
    }

    /// Restrict this source to trackers of one service type.
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    /// The two OVHcloud status feeds, each bound to the service type of the same name.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("bare-metal-servers", BARE_METAL_FEED_URL)
                .with_service_type("bare-metal-servers"),
            Self::new("public-cloud", PUBLIC_CLOUD_FEED_URL).with_service_type("public-cloud"),
        ]
    }
}

/// Something that can fetch the current items of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch and parse the feed, returning its items in document order.
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<Incident>, FeedError>;
}

/// HTTP feed client.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
}

impl FeedClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client with the default timeout.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ovh-status-watcher/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl FeedFetcher for FeedClient {
    async fn fetch(&self, source: &FeedSource) -> Result<Vec<Incident>, FeedError> {
        debug!(feed = %source.name, url = %source.url, "Fetching feed");

        let response = self.http.get(&source.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: source.url.clone(),
            });
        }

        let content = response.text().await?;
        let items = parse_feed(&content)?;

        debug!(feed = %source.name, count = items.len(), "Parsed feed");
        Ok(items)
    }
}
