//! Scan Gateway models.
//!
//! Contains data types used across the scan gateway service.

use serde::{Deserialize, Serialize};

/// Inbound barcode scan event from dock scanner hardware.
///
/// Unknown JSON fields are tolerated: scanner firmware revisions attach
/// vendor extras that the gateway ignores.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanEvent {
    /// Pallet barcode as read by the scanner.
    pub barcode: String,

    /// Dock identifier where the scan happened.
    pub dock_number: String,

    /// Identifier of the scanning device.
    pub scanner_id: String,

    /// Measured pallet weight in kilograms.
    pub weight: u32,
}

impl ScanEvent {
    /// Validate required-field presence.
    ///
    /// The three string fields must be non-blank and the weight non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.barcode.trim().is_empty() {
            return Err("Barcode is required");
        }

        if self.dock_number.trim().is_empty() {
            return Err("Dock number is required");
        }

        if self.scanner_id.trim().is_empty() {
            return Err("Scanner ID is required");
        }

        if self.weight == 0 {
            return Err("Weight must be greater than 0");
        }

        Ok(())
    }
}

/// Projection of a [`ScanEvent`] carrying only the fields the pallet
/// service accepts.
///
/// Derived per dispatch; `dock_number` and `scanner_id` stay gateway-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PalletPayload {
    /// Pallet barcode.
    pub barcode: String,

    /// Pallet weight.
    pub weight: u32,
}

impl From<&ScanEvent> for PalletPayload {
    fn from(event: &ScanEvent) -> Self {
        Self {
            barcode: event.barcode.clone(),
            weight: event.weight,
        }
    }
}

/// Acknowledgment returned to the scanner.
///
/// Returned by `POST /v1/scan` with 202 Accepted. The forward outcome is
/// never reported back to the scanner; delivery is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAccepted {
    /// Always "accepted".
    pub status: String,

    /// Human-readable note for scanner operators.
    pub info: String,
}

/// Health check response.
///
/// Returned by the `/v1/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status ("healthy").
    pub status: String,

    /// Service name.
    pub service: String,
}
