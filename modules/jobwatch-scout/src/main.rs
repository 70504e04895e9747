use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jobwatch_common::Config;
use jobwatch_scout::{
    notify::Notifier,
    pipeline::{fetcher::HttpFeedFetcher, filter::KeywordFilter},
    scheduling::{run_poll_loop, JobChecker},
    server::{self, AppState},
    sources,
    store::JsonFileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("jobwatch_scout=info".parse()?)
                .add_directive("jobwatch_common=info".parse()?),
        )
        .init();

    info!("Junior doctor job watch starting...");

    // Load config
    let config = Config::from_env()?;
    config.log_redacted();

    let targets = sources::cycle_targets(&sources::default_sources(), &config.keywords);
    let checker = Arc::new(JobChecker::new(
        Arc::new(HttpFeedFetcher::new()?),
        Notifier::from_config(&config)?,
        Arc::new(JsonFileStore::new(config.seen_jobs_path.clone())),
        targets,
        KeywordFilter::new(&config.keywords, config.keyword_filter),
    ));

    // Background poller
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(run_poll_loop(checker, config.poll_interval, shutdown_rx));

    // Liveness server
    let app = server::router(Arc::new(AppState::new()));
    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Liveness endpoint listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // A cycle in progress is not cancelled; give it a moment, then exit anyway.
    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(Duration::from_secs(5), poller).await.is_err() {
        warn!("Poll loop still busy after shutdown request, exiting");
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
