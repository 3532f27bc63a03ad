//! # Scan Gateway Test Utilities
//!
//! Shared test utilities for the scan gateway service.
//!
//! This crate provides:
//! - Server test harness (`TestGatewayServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sg_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestGatewayServer::spawn("http://localhost:9").await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .get(format!("{}/v1/health", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
