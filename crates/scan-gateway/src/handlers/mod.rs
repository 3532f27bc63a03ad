//! HTTP handlers for the scan gateway.
//!
//! Handlers validate incoming requests and delegate the actual
//! forwarding work to the services layer.

pub mod health;
pub mod scan;

pub use health::health_check;
pub use scan::ingest_scan;
