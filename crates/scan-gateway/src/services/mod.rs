//! Service layer for the scan gateway.
//!
//! This module contains services that talk to the pallet service and
//! encapsulate the forwarding pipeline.
//!
//! # Components
//!
//! - `pallet_client` - HTTP client for the pallet creation endpoint
//! - `forwarder` - fire-and-forget dispatcher with credential retry

pub mod forwarder;
pub mod pallet_client;

pub use forwarder::PalletForwarder;
pub use pallet_client::{PalletApiError, PalletClient, DEFAULT_PALLET_TIMEOUT};
