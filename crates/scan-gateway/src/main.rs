//! Scan Gateway
//!
//! Entry point for the warehouse scan ingestion gateway. Accepts barcode
//! scans from dock scanners over HTTP and forwards them to the pallet
//! service with cached service-account credentials.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Initialize the credential cache for the pallet service account
//! 3. Initialize the pallet client and forwarder
//! 4. Start the HTTP server
//! 5. Wait for shutdown signal

#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::credentials::{CredentialCache, CredentialCacheConfig};
use scan_gateway::config::Config;
use scan_gateway::routes::{self, AppState};
use scan_gateway::services::{PalletClient, PalletForwarder, DEFAULT_PALLET_TIMEOUT};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scan_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scan Gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        pallet_api_base_url = %config.pallet_api_base_url,
        bind_address = %config.bind_address,
        token_ttl_seconds = config.token_ttl_seconds,
        "Configuration loaded successfully"
    );

    // Initialize the credential cache for the pallet service account
    let credential_config = CredentialCacheConfig::new(
        config.pallet_api_base_url.clone(),
        config.pallet_api_username.clone(),
        config.pallet_api_password.clone(),
    )
    .with_token_ttl(Duration::from_secs(config.token_ttl_seconds));

    let credentials = CredentialCache::new(credential_config).map_err(|e| {
        error!("Failed to initialize credential cache: {}", e);
        e
    })?;

    // Initialize the pallet client and forwarder
    let pallet_client = PalletClient::new(&config.pallet_api_base_url, DEFAULT_PALLET_TIMEOUT)
        .map_err(|e| {
            error!("Failed to initialize pallet client: {}", e);
            e
        })?;

    let forwarder = PalletForwarder::new(Arc::new(credentials), pallet_client);

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState { config, forwarder });

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Scan Gateway listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Scan Gateway shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
///
/// In-flight forwards run on detached tasks and are abandoned at process
/// exit; delivery is best effort.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
