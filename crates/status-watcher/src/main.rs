//! OVH status watcher service.
//!
//! Polls the status feeds and notifies webhook trackers of new incidents,
//! while serving a JSON API to manage trackers and inspect the hierarchy.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use broadcaster::Broadcaster;
use database::Database;
use status_feed::FeedClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use watcher::{DedupeIndex, EntityStore, PollLoop};

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, feeds = config.feeds.len(), "Starting status watcher");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    for feed in EntityStore::new(db.clone()).unbound_sources(&config.feeds).await? {
        warn!(
            feed = %feed.name,
            service_type = feed.service_type.as_deref().unwrap_or_default(),
            "Feed is bound to an unknown service type; its incidents will reach no tracker"
        );
    }

    // Start the poll loop
    let dedupe = Arc::new(DedupeIndex::with_capacity(config.dedupe_capacity));
    let poll_loop = PollLoop::new(
        db.clone(),
        FeedClient::with_timeout(config.http_timeout)?,
        Broadcaster::with_timeout(config.http_timeout)?,
        Arc::clone(&dedupe),
        config.poll_config(),
    );

    let shutdown = CancellationToken::new();
    let poller = tokio::spawn(poll_loop.run(shutdown.clone()));

    // Build router
    let app = routes::router().with_state(AppState::new(db.clone(), dedupe));

    // Start server
    info!(addr = %config.addr, "Tracker API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = poller.await {
        error!("Poll loop task failed: {}", e);
    }

    db.close().await;
    info!("Status watcher stopped");

    Ok(())
}

/// Resolve on Ctrl+C, cancelling the poll loop.
async fn shutdown_signal(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            shutdown.cancelled().await;
            return;
        }
    }

    shutdown.cancel();
}
