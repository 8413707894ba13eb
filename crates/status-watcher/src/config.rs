//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use status_feed::FeedSource;
use watcher::{PollConfig, DEFAULT_DEDUPE_CAPACITY};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Feeds polled each cycle.
    pub feeds: Vec<FeedSource>,
    /// Time between poll cycles.
    pub poll_interval: Duration,
    /// Number of incident keys remembered.
    pub dedupe_capacity: usize,
    /// Record existing feed items on startup without notifying.
    pub skip_backlog: bool,
    /// Timeout for feed fetches and webhook deliveries.
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `WATCHER_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:status-watcher.db?mode=rwc` |
    /// | `STATUS_FEEDS` | Comma-separated `name=url` feeds | bare metal and public cloud |
    /// | `FILTER_BY_SERVICE_TYPE` | Notify only trackers whose service type is the feed name | `true` |
    /// | `POLL_INTERVAL_SECS` | Seconds between poll cycles | `60` |
    /// | `DEDUPE_CAPACITY` | Incident keys remembered | `1000` |
    /// | `SKIP_BACKLOG` | Skip items present on first fetch | `false` |
    /// | `HTTP_TIMEOUT_SECS` | Outbound request timeout | `30` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("WATCHER_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = lookup("SQLITE_PATH")
            .unwrap_or_else(|| "sqlite:status-watcher.db?mode=rwc".to_string());

        let filter_by_service_type = parse_bool(&lookup, "FILTER_BY_SERVICE_TYPE", true)?;
        let mut feeds = match lookup("STATUS_FEEDS") {
            Some(value) if !value.trim().is_empty() => {
                let feeds = parse_feeds(&value)?;
                if feeds.is_empty() {
                    return Err(ConfigError::InvalidFeed(value));
                }
                feeds
            }
            _ => FeedSource::defaults(),
        };
        for feed in &mut feeds {
            feed.service_type = filter_by_service_type.then(|| feed.name.clone());
        }

        let poll_interval = Duration::from_secs(parse_number(&lookup, "POLL_INTERVAL_SECS", 60)?);
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidNumber {
                name: "POLL_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let dedupe_capacity =
            parse_number(&lookup, "DEDUPE_CAPACITY", DEFAULT_DEDUPE_CAPACITY as u64)? as usize;
        let skip_backlog = parse_bool(&lookup, "SKIP_BACKLOG", false)?;
        let http_timeout = Duration::from_secs(parse_number(&lookup, "HTTP_TIMEOUT_SECS", 30)?);

        Ok(Self {
            addr,
            database_url,
            feeds,
            poll_interval,
            dedupe_capacity,
            skip_backlog,
            http_timeout,
        })
    }

    /// Poll loop settings derived from this configuration.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::default()
            .with_interval(self.poll_interval)
            .with_sources(self.feeds.clone())
            .with_skip_backlog(self.skip_backlog)
    }
}

/// Parse a comma-separated list of `name=url` feeds.
pub fn parse_feeds(value: &str) -> Result<Vec<FeedSource>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidFeed(entry.to_string()))?;
            let (name, url) = (name.trim(), url.trim());

            if name.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidFeed(entry.to_string()));
            }

            Ok(FeedSource::new(name, url))
        })
        .collect()
}

fn parse_bool<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool { name, value }),
        },
    }
}

fn parse_number<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid WATCHER_ADDR format")]
    InvalidAddr,

    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid boolean for {name}: {value}")]
    InvalidBool { name: &'static str, value: String },

    #[error("Invalid STATUS_FEEDS entry (expected name=url): {0}")]
    InvalidFeed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:status-watcher.db?mode=rwc");
        assert_eq!(config.feeds, FeedSource::defaults());
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.dedupe_capacity, 1000);
        assert!(!config.skip_backlog);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_custom_feeds_bound_to_service_type() {
        let config = config_from(&[(
            "STATUS_FEEDS",
            "public-cloud=https://cloud.test/rss, bare-metal-servers = https://metal.test/rss",
        )])
        .unwrap();

        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[1].name, "bare-metal-servers");
        assert_eq!(config.feeds[1].url, "https://metal.test/rss");
        assert_eq!(config.feeds[1].service_type.as_deref(), Some("bare-metal-servers"));
    }

    #[test]
    fn test_service_type_filter_disabled() {
        let config = config_from(&[("FILTER_BY_SERVICE_TYPE", "false")]).unwrap();
        assert!(config.feeds.iter().all(|feed| feed.service_type.is_none()));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config_from(&[("WATCHER_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            config_from(&[("POLL_INTERVAL_SECS", "soon")]),
            Err(ConfigError::InvalidNumber { name: "POLL_INTERVAL_SECS", .. })
        ));
        assert!(matches!(
            config_from(&[("POLL_INTERVAL_SECS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config_from(&[("SKIP_BACKLOG", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
    }

    #[test]
    fn test_parse_feeds_rejects_malformed_entries() {
        assert!(matches!(
            parse_feeds("just-a-name"),
            Err(ConfigError::InvalidFeed(_))
        ));
        assert!(matches!(
            parse_feeds("name=ftp://feed.test"),
            Err(ConfigError::InvalidFeed(_))
        ));
        assert!(parse_feeds(" , ").unwrap().is_empty());
        assert!(matches!(
            config_from(&[("STATUS_FEEDS", " , ")]),
            Err(ConfigError::InvalidFeed(_))
        ));
    }

    #[test]
    fn test_poll_config() {
        let config = config_from(&[("SKIP_BACKLOG", "1"), ("POLL_INTERVAL_SECS", "5")]).unwrap();
        let poll = config.poll_config();

        assert!(poll.skip_backlog);
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.sources, config.feeds);
    }
}
