//! Common utilities shared across scan gateway components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for downstream credential acquisition and caching
pub mod credentials;
