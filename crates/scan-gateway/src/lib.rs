//! Scan Gateway Service Library
//!
//! This library provides the core functionality for the warehouse scan
//! gateway - a stateless HTTP service sitting between dock scanner
//! hardware and the pallet tracking service:
//!
//! - Scan ingestion (validate, acknowledge, forward asynchronously)
//! - Service account login against the pallet service
//! - Cached bearer credentials with invalidate-and-retry on rejection
//!
//! # Architecture
//!
//! The gateway follows the Handler -> Service pattern:
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs
//! ```
//!
//! Forwarding is fire-and-forget: the scan handler acknowledges the
//! scanner with 202 Accepted and detaches the downstream delivery, so
//! scanner-facing latency never depends on the pallet service.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `models` - Data models
//! - `routes` - Axum router setup
//! - `services` - Pallet service client and forwarding dispatcher

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
