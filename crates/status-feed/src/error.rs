//! Error types for status-feed.

use thiserror::Error;

/// Errors raised when an incident title does not follow the expected grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    /// The title has no bracketed location group such as `[FRA/SBG5]`.
    #[error("no location segment in title: {0}")]
    NoLocationSegment(String),

    /// The title mentions a rack but no label follows the rack word.
    #[error("rack label not found in title: {0}")]
    RackLabelNotFound(String),
}

/// Errors that can occur while fetching or parsing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed endpoint answered with a non-success status.
    #[error("feed returned HTTP {status}: {url}")]
    Status { status: u16, url: String },

    /// The body is not an RSS or Atom document.
    #[error("malformed feed: {0}")]
    Malformed(String),
}
