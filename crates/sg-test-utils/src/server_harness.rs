//! Test server harness for E2E testing
//!
//! Provides `TestGatewayServer` for spawning real gateway instances in tests.

use common::credentials::{CredentialCache, CredentialCacheConfig};
use scan_gateway::config::Config;
use scan_gateway::routes::{self, AppState};
use scan_gateway::services::{PalletClient, PalletForwarder, DEFAULT_PALLET_TIMEOUT};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Test harness for spawning the scan gateway in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_scan_flow_e2e() -> Result<(), anyhow::Error> {
///     let pallet_api = wiremock::MockServer::start().await;
///     let server = TestGatewayServer::spawn(&pallet_api.uri()).await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/v1/scan", server.url()))
///         .json(&serde_json::json!({
///             "barcode": "PAL-0042",
///             "dock_number": "D-07",
///             "scanner_id": "dock7-gate",
///             "weight": 412,
///         }))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 202);
///     Ok(())
/// }
/// ```
pub struct TestGatewayServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestGatewayServer {
    /// Spawn a new test gateway instance.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Forward accepted scans to `pallet_api_base_url`
    /// - Start the HTTP server in the background
    ///
    /// # Arguments
    /// * `pallet_api_base_url` - Base URL of the pallet service (typically a
    ///   `wiremock::MockServer` URI)
    ///
    /// # Returns
    /// * `Ok(TestGatewayServer)` - Running server instance
    /// * `Err(anyhow::Error)` - If server spawn fails
    pub async fn spawn(pallet_api_base_url: &str) -> Result<Self, anyhow::Error> {
        // Build configuration for test environment
        let vars = HashMap::from([
            (
                "PALLET_API_BASE_URL".to_string(),
                pallet_api_base_url.to_string(),
            ),
            ("PALLET_API_USERNAME".to_string(), "dock-gateway".to_string()),
            ("PALLET_API_PASSWORD".to_string(), "test-password".to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // Wire up the credential cache and forwarder the same way main() does
        let credential_config = CredentialCacheConfig::new(
            config.pallet_api_base_url.clone(),
            config.pallet_api_username.clone(),
            config.pallet_api_password.clone(),
        )
        .with_token_ttl(Duration::from_secs(config.token_ttl_seconds));

        let credentials = CredentialCache::new(credential_config)
            .map_err(|e| anyhow::anyhow!("Failed to create credential cache: {}", e))?;

        let pallet_client = PalletClient::new(&config.pallet_api_base_url, DEFAULT_PALLET_TIMEOUT)
            .map_err(|e| anyhow::anyhow!("Failed to create pallet client: {}", e))?;

        let forwarder = PalletForwarder::new(Arc::new(credentials), pallet_client);

        // Create application state
        let state = Arc::new(AppState {
            config: config.clone(),
            forwarder,
        });

        // Build routes using scan-gateway's real route builder
        let app = routes::build_routes(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            // Use into_make_service_with_connect_info to support SocketAddr extraction
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestGatewayServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task to ensure immediate cleanup
        // when the test completes. This stops the server gracefully.
        self._handle.abort();
    }
}
