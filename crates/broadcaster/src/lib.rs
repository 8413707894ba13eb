//! Webhook broadcast utilities for the OVH status watcher.
//!
//! This crate renders status incidents into Discord-compatible webhook
//! messages and delivers them to subscriber endpoints.
//!
//! # Example
//!
//! ```no_run
//! use broadcaster::{Broadcaster, Notifier, WebhookMessage};
//!
//! # async fn example() -> Result<(), broadcaster::Error> {
//! let broadcaster = Broadcaster::new()?;
//!
//! let message = WebhookMessage::render(
//!     "Scheduled maintenance [FRA/SBG5]",
//!     "<p><strong>Scheduled</strong> - Work in progress</p>",
//! );
//! broadcaster
//!     .deliver("https://discord.com/api/webhooks/1/abc", &message)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod markup;
pub mod message;

pub use message::{Embed, EmbedFooter, EmbedImage, WebhookMessage};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

/// Maximum number of response body bytes kept in a rejection error.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Errors that can occur during delivery.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("webhook rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Something that can deliver a rendered message to an endpoint.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to one endpoint.
    async fn deliver(&self, endpoint: &str, message: &WebhookMessage) -> Result<(), Error>;
}

/// A broadcaster posting messages to webhook endpoints.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    http: Client,
}

impl Broadcaster {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a broadcaster with the default timeout.
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Create a broadcaster with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Notifier for Broadcaster {
    async fn deliver(&self, endpoint: &str, message: &WebhookMessage) -> Result<(), Error> {
        debug!(endpoint = %endpoint, "Posting webhook message");

        let response = self.http.post(endpoint).json(message).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Rejected {
            status: status.as_u16(),
            body: truncate_utf8(&body, MAX_ERROR_BODY_BYTES),
        })
    }
}

fn truncate_utf8(input: &str, max_bytes: usize) -> String {
    if input.len() <= max_bytes {
        return input.to_string();
    }

    let mut idx = max_bytes;
    while idx > 0 && !input.is_char_boundary(idx) {
        idx -= 1;
    }

    input[..idx].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_deliver_posts_json() {
        let mock_server = MockServer::start().await;
        let message = WebhookMessage::render("[GRA11] Network", "<b>Investigating</b>");

        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_json(&message))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let broadcaster = Broadcaster::new().unwrap();
        broadcaster
            .deliver(&format!("{}/hook", mock_server.uri()), &message)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deliver_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Webhook"))
            .mount(&mock_server)
            .await;

        let broadcaster = Broadcaster::new().unwrap();
        let message = WebhookMessage::render("Incident", "");
        let result = broadcaster
            .deliver(&format!("{}/hook", mock_server.uri()), &message)
            .await;

        match result {
            Err(Error::Rejected { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "Unknown Webhook");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate_utf8("hello", 10), "hello");
        assert_eq!(truncate_utf8("héllo", 2), "h");
    }
}
