//! Health check handler.
//!
//! Provides the liveness endpoint for the scan gateway.

use crate::errors::SgError;
use crate::models::HealthResponse;
use axum::Json;
use tracing::instrument;

/// Service name reported by the health endpoint.
const SERVICE_NAME: &str = "scan-gateway";

/// Health check handler.
///
/// Reports the process as healthy whenever it can answer. The pallet
/// service is not probed: the gateway keeps accepting scans while the
/// downstream is down, and failed forwards are logged by the forwarder.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "scan-gateway"
/// }
/// ```
#[instrument(skip_all, name = "sg.health.check")]
pub async fn health_check() -> Result<Json<HealthResponse>, SgError> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    }))
}
