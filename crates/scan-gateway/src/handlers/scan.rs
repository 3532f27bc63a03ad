//! Scan ingestion handler.
//!
//! Accepts barcode scan events from dock scanners and hands them to the
//! forwarder. The handler answers as soon as the event is validated;
//! delivery to the pallet service happens on a background task.

use crate::errors::SgError;
use crate::models::{ScanAccepted, ScanEvent};
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Ingest a scan event.
///
/// Validates the event and queues it for forwarding, then returns
/// `202 Accepted` immediately. A `202` does not mean the pallet service
/// received the scan; forwarding failures are logged and dropped.
///
/// ## Request Body
///
/// ```json
/// {
///   "barcode": "PAL-0042",
///   "dock_number": "D-07",
///   "scanner_id": "dock7-gate",
///   "weight": 412
/// }
/// ```
///
/// ## Errors
///
/// Returns `400 Bad Request` when the body is not valid JSON or a
/// required field is missing or blank.
#[instrument(skip_all, name = "sg.scan.ingest")]
pub async fn ingest_scan(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<ScanAccepted>), SgError> {
    // Deserialize request body manually to return 400 (not Axum's default 422)
    let event: ScanEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(
            target: "sg.handlers.scan",
            error = %e,
            "Failed to deserialize scan event"
        );
        SgError::BadRequest("Invalid request body".to_string())
    })?;

    event
        .validate()
        .map_err(|e| SgError::BadRequest(e.to_string()))?;

    tracing::info!(
        target: "sg.handlers.scan",
        barcode = %event.barcode,
        dock_number = %event.dock_number,
        scanner_id = %event.scanner_id,
        weight = event.weight,
        "Scan accepted"
    );

    state.forwarder.spawn(event);

    Ok((
        StatusCode::ACCEPTED,
        Json(ScanAccepted {
            status: "accepted".to_string(),
            info: "Scan queued for forwarding".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    // Exercising the handler requires an AppState wired to a live
    // forwarder. The full request path, including validation errors and
    // background forwarding, is covered by the integration tests in
    // tests/scan_tests.rs.
}
