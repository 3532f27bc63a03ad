//! Pallet service HTTP client.
//!
//! Sends pallet records to the downstream pallet tracking service with a
//! bearer credential. The client distinguishes a credential rejection
//! (HTTP 401) from every other failure so the forwarder can run its
//! invalidate-and-retry path.
//!
//! # Security
//!
//! - The bearer token is taken per call and never stored or logged
//! - Error response bodies are carried as bounded excerpts
//! - Timeouts prevent hanging connections

use crate::models::PalletPayload;
use common::credentials::body_excerpt;
use common::secret::{ExposeSecret, SecretString};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{instrument, trace, warn};

/// Default total timeout for pallet service requests.
pub const DEFAULT_PALLET_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur sending a pallet record.
#[derive(Error, Debug)]
pub enum PalletApiError {
    /// Request could not be completed (connect failure, timeout).
    #[error("Pallet request failed: {0}")]
    Transport(String),

    /// The bearer credential was rejected (HTTP 401).
    #[error("Pallet service rejected the bearer credential")]
    CredentialRejected,

    /// The pallet service rejected the record with another error status.
    #[error("Pallet service returned status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the pallet endpoint.
        status: StatusCode,
        /// Bounded excerpt of the response body.
        body: String,
    },

    /// HTTP client construction failed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// HTTP client for the pallet creation endpoint.
#[derive(Clone)]
pub struct PalletClient {
    /// HTTP client with configured timeout.
    client: Client,

    /// Full URL of the pallet creation endpoint.
    pallets_url: String,
}

impl PalletClient {
    /// Create a new pallet client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Pallet service base URL (e.g., "http://localhost:8000")
    /// * `timeout` - Total request timeout
    ///
    /// # Errors
    ///
    /// Returns `PalletApiError::Configuration` if the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PalletApiError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PalletApiError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            pallets_url: format!("{}/api/pallets", base_url),
        })
    }

    /// Send one pallet record with the given bearer token.
    ///
    /// Returns the 2xx status on success so the caller can log the
    /// terminal outcome.
    ///
    /// # Errors
    ///
    /// - `PalletApiError::Transport` - request failed or timed out
    /// - `PalletApiError::CredentialRejected` - HTTP 401
    /// - `PalletApiError::Rejected` - any other non-2xx status
    #[instrument(skip_all, fields(barcode = %payload.barcode))]
    pub async fn create_pallet(
        &self,
        payload: &PalletPayload,
        token: &SecretString,
    ) -> Result<StatusCode, PalletApiError> {
        let response = self
            .client
            .post(&self.pallets_url)
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "sg.services.pallet_client", error = %e, "Pallet request failed");
                PalletApiError::Transport(e.to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            Ok(status)
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(
                target: "sg.services.pallet_client",
                "Bearer credential rejected by pallet service"
            );
            Err(PalletApiError::CredentialRejected)
        } else {
            let body = response.text().await.unwrap_or_else(|e| {
                trace!(target: "sg.services.pallet_client", error = %e, "Failed to read error response body");
                "<failed to read body>".to_string()
            });
            warn!(
                target: "sg.services.pallet_client",
                status = %status,
                "Pallet service rejected the record"
            );
            Err(PalletApiError::Rejected {
                status,
                body: body_excerpt(&body),
            })
        }
    }
}
