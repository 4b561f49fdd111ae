//! # Threadcast
//!
//! Polls the Twitter/X recent search API for a keyword and republishes the
//! matches as a thread, while serving a small HTTP surface for health checks.
//!
//! ## Environment Variables
//!
//! See [`threadcast::BotConfig::from_vars`] for the full list. Required:
//! `CONSUMER_KEY`, `CONSUMER_SECRET`, `ACCESS_TOKEN_KEY`,
//! `ACCESS_TOKEN_SECRET`, `SEARCH_KEYWORD`.
//!
//! ## API Endpoints
//!
//! - `GET /`: Returns a banner
//! - `GET /health`: Returns service health status
//! - `GET /status`: Returns the outcome of the last poll cycle

use axum::{routing::get, Router};
use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use threadcast::{
    get_server_port, handle_health, handle_root, handle_status, AttachmentResolver, BotConfig,
    PlatformApi, PollSettings, PollStatus, Poller, SharedStatus, TwitterClient,
};

/// Main entry point for the threadcast bot.
///
/// Initializes logging, loads the configuration, starts the poll loop in the
/// background and serves the HTTP surface. Ctrl+C stops the poll loop between
/// cycles and shuts the server down.
///
/// # Logging
///
/// The application uses the `env_logger` crate. Log levels can be controlled
/// via the `RUST_LOG` environment variable.
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 3000
/// cargo run
///
/// # Run with debug logging
/// RUST_LOG=debug cargo run
/// ```
#[tokio::main]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match TwitterClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create Twitter client: {}", e);
            std::process::exit(1);
        }
    };
    let resolver = match AttachmentResolver::new(config.http_timeout) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to create attachment resolver: {}", e);
            std::process::exit(1);
        }
    };

    let status: SharedStatus = Arc::new(RwLock::new(PollStatus::default()));
    let api: Arc<dyn PlatformApi> = Arc::new(client);
    let poller = Poller::new(
        api,
        resolver,
        PollSettings::from(&config),
        Arc::clone(&status),
    );

    // Start the poll loop
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller_handle = tokio::spawn(async move {
        if let Err(e) = poller.run(shutdown_rx).await {
            error!("Poll loop failed to start: {}", e);
        }
    });

    // Build the HTTP application with all routes and middleware
    let app = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .with_state(status)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Starting threadcast server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run the HTTP server and the poll loop until one ends or Ctrl+C arrives
    let mut shutdown_requested = false;
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = &mut poller_handle => {
            info!("Poll loop task completed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping poll loop");
            shutdown_requested = true;
        }
    }

    if shutdown_requested {
        let _ = shutdown_tx.send(true);
        if let Err(e) = poller_handle.await {
            error!("Poll loop task panicked: {}", e);
        }
    }
}
