//! Forwarding dispatcher for scan events.
//!
//! Implements the fire-and-forget pipeline between the scan handler and
//! the pallet service: project the event to the downstream payload,
//! acquire a cached credential, send, and on a credential rejection
//! invalidate the cache and retry exactly once. Outcomes are logged and
//! never surfaced to the scanner, which has already been acknowledged.

use crate::models::{PalletPayload, ScanEvent};
use crate::services::pallet_client::{PalletApiError, PalletClient};
use common::credentials::{CredentialCache, CredentialError};
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Terminal outcome of a forward attempt, for logging only.
#[derive(Error, Debug)]
enum ForwardError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Pallet(#[from] PalletApiError),
}

/// Fire-and-forget dispatcher for scan events.
///
/// Cloneable handle; all clones share one credential cache, so a 401
/// observed by any in-flight forward refreshes the credential for all.
#[derive(Clone)]
pub struct PalletForwarder {
    credentials: Arc<CredentialCache>,
    client: PalletClient,
}

impl PalletForwarder {
    /// Create a forwarder over a shared credential cache.
    pub fn new(credentials: Arc<CredentialCache>, client: PalletClient) -> Self {
        Self {
            credentials,
            client,
        }
    }

    /// Schedule a forward without awaiting its outcome.
    ///
    /// Spawns one detached task per event. There is no bound on in-flight
    /// forwards and no completion signal back to the caller; delivery is
    /// best-effort and a process exit may abandon in-flight forwards.
    pub fn spawn(&self, event: ScanEvent) {
        let forwarder = self.clone();
        tokio::spawn(async move {
            forwarder.forward(event).await;
        });
    }

    /// Forward one scan event to the pallet service.
    ///
    /// On HTTP 401 the cached credential is invalidated and the
    /// acquire-and-send sequence runs once more; that second outcome is
    /// terminal whatever it is. Every failure is logged and swallowed.
    #[instrument(skip_all, fields(barcode = %event.barcode, scanner_id = %event.scanner_id))]
    pub async fn forward(&self, event: ScanEvent) {
        let payload = PalletPayload::from(&event);

        match self.try_send(&payload).await {
            Ok(status) => {
                info!(
                    target: "sg.services.forwarder",
                    status = %status,
                    "Scan forwarded to pallet service"
                );
            }
            Err(e) => {
                warn!(
                    target: "sg.services.forwarder",
                    error = %e,
                    "Dropping scan after forward failure"
                );
            }
        }
    }

    /// Acquire a credential and send, retrying once after a rejection.
    async fn try_send(&self, payload: &PalletPayload) -> Result<StatusCode, ForwardError> {
        let token = self.credentials.acquire().await?;

        match self.client.create_pallet(payload, &token).await {
            Err(PalletApiError::CredentialRejected) => {
                info!(
                    target: "sg.services.forwarder",
                    "Credential rejected, retrying once with a fresh login"
                );
                self.credentials.invalidate().await;
                let token = self.credentials.acquire().await?;
                Ok(self.client.create_pallet(payload, &token).await?)
            }
            result => Ok(result?),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::services::pallet_client::DEFAULT_PALLET_TIMEOUT;
    use common::credentials::CredentialCacheConfig;
    use common::secret::SecretString;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_event() -> ScanEvent {
        ScanEvent {
            barcode: "PAL-001".to_string(),
            dock_number: "D-07".to_string(),
            scanner_id: "SCAN-12".to_string(),
            weight: 120,
        }
    }

    fn test_forwarder(base_url: &str) -> PalletForwarder {
        let config = CredentialCacheConfig::new(
            base_url.to_string(),
            "dock-gateway".to_string(),
            SecretString::from("test-secret"),
        );
        let credentials = Arc::new(CredentialCache::new(config).unwrap());
        let client = PalletClient::new(base_url, DEFAULT_PALLET_TIMEOUT).unwrap();
        PalletForwarder::new(credentials, client)
    }

    /// Mount a login mock that issues `token-0`, `token-1`, ... and counts calls.
    async fn mount_counting_login(server: &MockServer) -> Arc<AtomicU32> {
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(move |_: &wiremock::Request| {
                let count = call_count_clone.fetch_add(1, Ordering::Relaxed);
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": format!("token-{}", count),
                    "token_type": "bearer"
                }))
            })
            .mount(server)
            .await;

        call_count
    }

    async fn pallet_request_count(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/api/pallets")
            .count()
    }

    #[tokio::test]
    async fn test_forward_sends_projected_payload_with_bearer() {
        let mock_server = MockServer::start().await;
        mount_counting_login(&mock_server).await;

        // The downstream body must be the projection only; dock_number and
        // scanner_id never leave the gateway.
        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .and(header("Authorization", "Bearer token-0"))
            .and(body_json(
                serde_json::json!({"barcode": "PAL-001", "weight": 120}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;
    }

    #[tokio::test]
    async fn test_forward_cold_cache_logs_in_then_sends() {
        let mock_server = MockServer::start().await;
        let login_count = mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;

        assert_eq!(login_count.load(Ordering::Relaxed), 1);
        assert_eq!(pallet_request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_forward_reuses_cached_token() {
        let mock_server = MockServer::start().await;
        let login_count = mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .and(header("Authorization", "Bearer token-0"))
            .respond_with(ResponseTemplate::new(201))
            .expect(2)
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;
        forwarder.forward(sample_event()).await;

        // Both sends carried the cached token from a single login
        assert_eq!(login_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_forward_retries_once_after_credential_rejection() {
        let mock_server = MockServer::start().await;
        let login_count = mount_counting_login(&mock_server).await;

        // First send (token-0) is rejected; the retry must carry a token
        // from a fresh login, not the invalidated one.
        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .and(header("Authorization", "Bearer token-0"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .and(header("Authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;

        assert_eq!(login_count.load(Ordering::Relaxed), 2);
        assert_eq!(pallet_request_count(&mock_server).await, 2);
    }

    #[tokio::test]
    async fn test_forward_gives_up_after_second_rejection() {
        let mock_server = MockServer::start().await;
        let login_count = mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;

        // At most two logins and two sends per dispatch, then give up
        assert_eq!(login_count.load(Ordering::Relaxed), 2);
        assert_eq!(pallet_request_count(&mock_server).await, 2);
    }

    #[tokio::test]
    async fn test_forward_drops_scan_when_login_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;

        // No credential, no send attempt
        assert_eq!(pallet_request_count(&mock_server).await, 0);
    }

    #[tokio::test]
    async fn test_forward_does_not_retry_other_rejections() {
        let mock_server = MockServer::start().await;
        let login_count = mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string(r#"{"detail":"duplicate barcode"}"#),
            )
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.forward(sample_event()).await;

        assert_eq!(login_count.load(Ordering::Relaxed), 1);
        assert_eq!(pallet_request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_forward_swallows_transport_failure() {
        let mock_server = MockServer::start().await;
        mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let config = CredentialCacheConfig::new(
            mock_server.uri(),
            "dock-gateway".to_string(),
            SecretString::from("test-secret"),
        );
        let credentials = Arc::new(CredentialCache::new(config).unwrap());
        let client = PalletClient::new(&mock_server.uri(), Duration::from_millis(100)).unwrap();
        let forwarder = PalletForwarder::new(credentials, client);

        // Must complete without panicking or retrying
        forwarder.forward(sample_event()).await;

        assert_eq!(pallet_request_count(&mock_server).await, 1);
    }

    #[tokio::test]
    async fn test_spawn_is_detached() {
        let mock_server = MockServer::start().await;
        mount_counting_login(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/pallets"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&mock_server)
            .await;

        let forwarder = test_forwarder(&mock_server.uri());
        forwarder.spawn(sample_event());

        // The spawned task completes on its own
        for _ in 0..50 {
            if pallet_request_count(&mock_server).await == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("spawned forward never reached the pallet service");
    }
}
