//! The feed poll loop.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use broadcaster::Notifier;
use database::Database;
use status_feed::{title, FeedFetcher, FeedSource, Incident};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dedupe::{incident_key, DedupeIndex};
use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::{Result, WatcherError};
use crate::store::{EntityStore, Reconciled};

/// Default time between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Phase of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Parsing,
    Reconciling,
    Dispatching,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollState::Idle => "idle",
            PollState::Fetching => "fetching",
            PollState::Parsing => "parsing",
            PollState::Reconciling => "reconciling",
            PollState::Dispatching => "dispatching",
        };
        f.write_str(name)
    }
}

/// Configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Time between cycles.
    pub interval: Duration,

    /// Feeds polled each cycle, in order.
    pub sources: Vec<FeedSource>,

    /// Record the items of each feed's first successful fetch as seen
    /// without notifying anyone.
    pub skip_backlog: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            sources: FeedSource::defaults(),
            skip_backlog: false,
        }
    }
}

impl PollConfig {
    /// Set the time between cycles.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the polled feeds.
    pub fn with_sources(mut self, sources: Vec<FeedSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Enable or disable backlog skipping.
    pub fn with_skip_backlog(mut self, skip_backlog: bool) -> Self {
        self.skip_backlog = skip_backlog;
        self
    }
}

/// What happened to a single incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentOutcome {
    /// The incident was already notified.
    AlreadySeen,
    /// The title names a rack that does not exist.
    UnknownRack(String),
    /// The incident was marked and delivered.
    Dispatched(DispatchReport),
}

/// Counters for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub feeds_polled: usize,
    pub feeds_failed: usize,
    pub incidents_seen: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deliveries_sent: usize,
    pub deliveries_failed: usize,
}

/// Polls feeds and notifies the trackers of every new incident.
pub struct PollLoop<F: FeedFetcher, N: Notifier> {
    fetcher: F,
    store: EntityStore,
    dispatcher: Dispatcher<N>,
    dedupe: Arc<DedupeIndex>,
    config: PollConfig,
    /// Feeds whose backlog has been recorded.
    primed: HashSet<String>,
    state: PollState,
}

impl<F: FeedFetcher, N: Notifier> PollLoop<F, N> {
    pub fn new(
        db: Database,
        fetcher: F,
        notifier: N,
        dedupe: Arc<DedupeIndex>,
        config: PollConfig,
    ) -> Self {
        Self {
            fetcher,
            store: EntityStore::new(db.clone()),
            dispatcher: Dispatcher::new(db, notifier),
            dedupe,
            config,
            primed: HashSet::new(),
            state: PollState::Idle,
        }
    }

    /// The shared dedupe index.
    pub fn dedupe(&self) -> Arc<DedupeIndex> {
        Arc::clone(&self.dedupe)
    }

    /// Current phase.
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Run cycles on the configured interval until the token is cancelled.
    ///
    /// The first cycle starts immediately. A cycle that overruns the interval
    /// delays the next tick instead of bursting.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            feeds = self.config.sources.len(),
            poll_interval = ?self.config.interval,
            skip_backlog = self.config.skip_backlog,
            "Starting poll loop"
        );

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping poll loop");
                    break;
                }

                _ = ticker.tick() => {
                    self.poll_once(&shutdown).await;
                }
            }
        }
    }

    /// Run a single cycle over every feed.
    pub async fn poll_once(&mut self, shutdown: &CancellationToken) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let sources = self.config.sources.clone();

        for source in &sources {
            if shutdown.is_cancelled() {
                break;
            }
            self.poll_source(source, shutdown, &mut summary).await;
        }

        self.set_state(PollState::Idle);

        info!(
            feeds_polled = summary.feeds_polled,
            feeds_failed = summary.feeds_failed,
            incidents = summary.incidents_seen,
            dispatched = summary.dispatched,
            skipped = summary.skipped,
            failed = summary.failed,
            deliveries_sent = summary.deliveries_sent,
            deliveries_failed = summary.deliveries_failed,
            "Poll cycle complete"
        );

        summary
    }

    async fn poll_source(
        &mut self,
        source: &FeedSource,
        shutdown: &CancellationToken,
        summary: &mut CycleSummary,
    ) {
        self.set_state(PollState::Fetching);

        let incidents = match self.fetcher.fetch(source).await {
            Ok(incidents) => incidents,
            Err(e) => {
                error!(feed = %source.name, url = %source.url, "Failed to fetch feed: {}", e);
                summary.feeds_failed += 1;
                return;
            }
        };
        summary.feeds_polled += 1;

        if self.config.skip_backlog && !self.primed.contains(&source.url) {
            for incident in &incidents {
                self.dedupe
                    .mark_if_new(&incident_key(&source.url, &incident.id))
                    .await;
            }
            self.primed.insert(source.url.clone());

            info!(
                feed = %source.name,
                count = incidents.len(),
                "Recorded existing incidents without notifying"
            );
            return;
        }

        for incident in &incidents {
            if shutdown.is_cancelled() {
                break;
            }
            summary.incidents_seen += 1;

            match self.process_incident(source, incident).await {
                Ok(IncidentOutcome::AlreadySeen) => {
                    summary.skipped += 1;
                }
                Ok(IncidentOutcome::UnknownRack(label)) => {
                    warn!(
                        feed = %source.name,
                        incident = %incident.id,
                        rack = %label,
                        "Skipping incident for unknown rack"
                    );
                    summary.skipped += 1;
                }
                Ok(IncidentOutcome::Dispatched(report)) => {
                    summary.dispatched += 1;
                    summary.deliveries_sent += report.delivered;
                    summary.deliveries_failed += report.failed;
                }
                Err(WatcherError::Parse(e)) => {
                    warn!(
                        feed = %source.name,
                        incident = %incident.id,
                        title = %incident.title,
                        "Skipping incident with unparseable title: {}",
                        e
                    );
                    summary.failed += 1;
                }
                Err(e) => {
                    error!(
                        feed = %source.name,
                        incident = %incident.id,
                        "Failed to process incident: {}",
                        e
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    /// Parse, reconcile, mark and dispatch one incident.
    ///
    /// The incident is marked only once its recipients are known, so a
    /// storage failure leaves it to be retried on the next cycle. A title
    /// that cannot be parsed is marked immediately.
    pub async fn process_incident(
        &mut self,
        source: &FeedSource,
        incident: &Incident,
    ) -> Result<IncidentOutcome> {
        let key = incident_key(&source.url, &incident.id);
        if self.dedupe.contains(&key).await {
            return Ok(IncidentOutcome::AlreadySeen);
        }

        self.set_state(PollState::Parsing);
        let scope = match title::classify(&incident.title) {
            Ok(scope) => scope,
            Err(e) => {
                // Parsing is deterministic, so report a bad title only once
                self.dedupe.mark_if_new(&key).await;
                return Err(e.into());
            }
        };

        self.set_state(PollState::Reconciling);
        let targets = match self.store.resolve(&scope).await? {
            Reconciled::Targets(targets) => targets,
            Reconciled::UnknownRack(label) => return Ok(IncidentOutcome::UnknownRack(label)),
        };
        let recipients = self
            .dispatcher
            .resolve(&targets, incident, source.service_type.as_deref())
            .await?;

        if !self.dedupe.mark_if_new(&key).await {
            return Ok(IncidentOutcome::AlreadySeen);
        }

        self.set_state(PollState::Dispatching);
        let report = self.dispatcher.deliver(&recipients, incident).await;

        Ok(IncidentOutcome::Dispatched(report))
    }

    fn set_state(&mut self, state: PollState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Poll state transition");
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_config_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.sources.len(), 2);
        assert!(!config.skip_backlog);
    }

    #[test]
    fn test_poll_config_builders() {
        let config = PollConfig::default()
            .with_interval(Duration::from_secs(5))
            .with_sources(vec![FeedSource::new("test", "https://feed.test/rss")])
            .with_skip_backlog(true);

        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.sources.len(), 1);
        assert!(config.skip_backlog);
    }

    #[test]
    fn test_poll_state_display() {
        assert_eq!(PollState::Idle.to_string(), "idle");
        assert_eq!(PollState::Reconciling.to_string(), "reconciling");
    }
}
