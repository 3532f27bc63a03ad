//! Downstream service credential acquisition and caching.
//!
//! The pallet service authenticates callers with short-lived bearer tokens
//! issued by its login endpoint. This module owns that credential lifecycle:
//! a [`CredentialFetcher`] performs the form-urlencoded login, and a
//! [`CredentialCache`] holds the issued token behind a mutex until a fixed
//! freshness margin elapses or a caller invalidates it.
//!
//! # Features
//!
//! - Cached token reuse across concurrent forwards (mutex-guarded state)
//! - Fixed freshness margin kept below the issuer's real token lifetime
//! - Explicit invalidation for callers that observe a credential rejection
//! - Bounded HTTP timeout on the login request
//!
//! # Concurrency
//!
//! The freshness check and the store of a fetched token each happen inside
//! the mutex; the login request itself does not. Two tasks that both observe
//! a stale cache may therefore each log in. The identity endpoint tolerates
//! repeated logins, and whichever fetch completes last is the value that
//! stays cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::credentials::{CredentialCache, CredentialCacheConfig};
//! use common::secret::{ExposeSecret, SecretString};
//!
//! let config = CredentialCacheConfig::new(
//!     "http://localhost:8000".to_string(),
//!     "dock-gateway".to_string(),
//!     SecretString::from("secret"),
//! );
//!
//! let cache = CredentialCache::new(config)?;
//!
//! // First acquire logs in; later acquires reuse the cached token.
//! let token = cache.acquire().await?;
//! let header = format!("Bearer {}", token.expose_secret());
//!
//! // After a 401 from the pallet service, force a fresh login.
//! cache.invalidate().await;
//! ```
//!
//! # Security
//!
//! - The service password and issued tokens are stored as `SecretString`
//! - Login and cache events are logged without credential values
//! - Error response bodies are carried as bounded excerpts

use crate::secret::{ExposeSecret, SecretString};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace, warn};

// =============================================================================
// Constants
// =============================================================================

/// Default cached credential lifetime (55 minutes).
///
/// The pallet service issues tokens valid for 60 minutes. The cached lifetime
/// stays below that so a token is replaced before the service would start
/// rejecting it. The token itself is opaque; its real expiry is never decoded.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

/// Default HTTP request timeout for the login request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum number of characters of an error response body carried in errors.
const BODY_EXCERPT_MAX_CHARS: usize = 256;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during credential acquisition.
#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    /// Login request could not be completed (connect failure, timeout).
    #[error("Login request failed: {0}")]
    Transport(String),

    /// Login rejected with a non-200 status.
    #[error("Login rejected with status {status}: {body}")]
    LoginFailed {
        /// HTTP status returned by the login endpoint.
        status: StatusCode,
        /// Bounded excerpt of the response body.
        body: String,
    },

    /// Login response could not be interpreted.
    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    /// HTTP client construction failed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for credential acquisition against the pallet service.
#[derive(Clone)]
pub struct CredentialCacheConfig {
    /// Pallet service base URL (e.g., `http://localhost:8000`).
    pub base_url: String,

    /// Service account username.
    pub username: String,

    /// Service account password (as `SecretString`).
    pub password: SecretString,

    /// How long a fetched token is served from the cache.
    pub token_ttl: Duration,

    /// HTTP request timeout for the login request.
    pub http_timeout: Duration,
}

impl std::fmt::Debug for CredentialCacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCacheConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl CredentialCacheConfig {
    /// Create a new configuration with default lifetime and timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Pallet service base URL. **Should use HTTPS in production.**
    /// * `username` - Service account username.
    /// * `password` - Service account password.
    #[must_use]
    pub fn new(base_url: String, username: String, password: SecretString) -> Self {
        Self {
            base_url,
            username,
            password,
            token_ttl: DEFAULT_TOKEN_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Set the cached credential lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the HTTP timeout for the login request.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

// =============================================================================
// Login Response
// =============================================================================

/// Login response from the pallet service.
#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[allow(dead_code)]
    #[serde(default)]
    token_type: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

// =============================================================================
// Credential Fetcher
// =============================================================================

/// Performs the form-urlencoded login against the pallet service.
///
/// Login succeeds only on an HTTP 200 response whose JSON body carries a
/// non-empty `access_token`. Every other outcome is an error carrying the
/// status and a body excerpt, or the underlying transport failure.
pub struct CredentialFetcher {
    http: reqwest::Client,
    login_url: String,
    username: String,
    password: SecretString,
}

impl CredentialFetcher {
    /// Create a fetcher from a cache configuration.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Configuration` if the HTTP client cannot
    /// be built.
    pub fn new(config: &CredentialCacheConfig) -> Result<Self, CredentialError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| {
                CredentialError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            login_url: format!("{}/api/auth/login", config.base_url),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Log in and return the issued bearer token.
    ///
    /// # Errors
    ///
    /// - `CredentialError::Transport` - request failed or timed out
    /// - `CredentialError::LoginFailed` - non-200 response
    /// - `CredentialError::InvalidResponse` - unparseable body or empty token
    #[instrument(skip_all)]
    pub async fn fetch(&self) -> Result<SecretString, CredentialError> {
        debug!(
            target: "common.credentials",
            username = %self.username,
            url = %self.login_url,
            "Logging in to pallet service"
        );

        let form_body = [
            ("username", self.username.as_str()),
            ("password", self.password.expose_secret()),
        ];

        let response = self
            .http
            .post(&self.login_url)
            .form(&form_body)
            .send()
            .await
            .map_err(|e| {
                debug!(target: "common.credentials", error = %e, "Login request failed");
                CredentialError::Transport(e.to_string())
            })?;

        let status = response.status();

        if status == StatusCode::OK {
            let login: LoginResponse = response.json().await.map_err(|e| {
                warn!(target: "common.credentials", error = %e, "Failed to parse login response");
                CredentialError::InvalidResponse(e.to_string())
            })?;

            if login.access_token.is_empty() {
                warn!(target: "common.credentials", "Login response carried an empty access_token");
                return Err(CredentialError::InvalidResponse(
                    "login response carried an empty access_token".to_string(),
                ));
            }

            debug!(target: "common.credentials", "Login succeeded");

            Ok(SecretString::from(login.access_token))
        } else {
            let body = response.text().await.unwrap_or_else(|e| {
                trace!(target: "common.credentials", error = %e, "Failed to read error response body");
                "<failed to read body>".to_string()
            });
            warn!(
                target: "common.credentials",
                status = %status,
                "Login rejected by pallet service"
            );
            Err(CredentialError::LoginFailed {
                status,
                body: body_excerpt(&body),
            })
        }
    }
}

// =============================================================================
// Credential Cache
// =============================================================================

/// Cached credential state.
#[derive(Clone)]
struct CachedCredential {
    token: SecretString,
    expires_at: i64,
}

/// Mutex-guarded credential cache for the pallet service.
///
/// Holds at most one credential for the lifetime of the process. `acquire`
/// serves the cached token while it is fresh and logs in through the
/// [`CredentialFetcher`] otherwise; `invalidate` drops the cached value so
/// the next `acquire` must log in again.
pub struct CredentialCache {
    fetcher: CredentialFetcher,
    token_ttl: Duration,
    state: Mutex<Option<CachedCredential>>,
}

impl CredentialCache {
    /// Create an empty cache.
    ///
    /// No login is attempted here; the first `acquire` performs it.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Configuration` if the HTTP client cannot
    /// be built.
    pub fn new(config: CredentialCacheConfig) -> Result<Self, CredentialError> {
        let token_ttl = config.token_ttl;
        let fetcher = CredentialFetcher::new(&config)?;

        Ok(Self {
            fetcher,
            token_ttl,
            state: Mutex::new(None),
        })
    }

    /// Return a usable bearer token, logging in if the cache is stale or empty.
    ///
    /// A failed login leaves any previously cached value untouched and is
    /// reported to the caller.
    ///
    /// # Errors
    ///
    /// Propagates the [`CredentialFetcher`] error when a login is needed
    /// and fails.
    #[instrument(skip_all)]
    pub async fn acquire(&self) -> Result<SecretString, CredentialError> {
        {
            let state = self.state.lock().await;
            if let Some(cached) = state.as_ref() {
                let now = chrono::Utc::now().timestamp();
                if now < cached.expires_at {
                    trace!(target: "common.credentials", "Serving cached credential");
                    return Ok(cached.token.clone());
                }
                debug!(target: "common.credentials", "Cached credential is stale");
            }
        }

        // Fetch outside the lock. A concurrent acquire that also saw a stale
        // cache performs its own login; the last completed fetch wins.
        let token = self.fetcher.fetch().await?;

        let now = chrono::Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)]
        let expires_at = now + self.token_ttl.as_secs() as i64;

        let mut state = self.state.lock().await;
        *state = Some(CachedCredential {
            token: token.clone(),
            expires_at,
        });

        debug!(
            target: "common.credentials",
            expires_at,
            "Credential cached"
        );

        Ok(token)
    }

    /// Drop the cached credential unconditionally.
    ///
    /// Called when the pallet service rejects the token (HTTP 401) so the
    /// next `acquire` performs a fresh login.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            debug!(target: "common.credentials", "Cached credential invalidated");
        }
    }
}

/// Truncate an HTTP error body for inclusion in error values and logs.
///
/// Bodies longer than the excerpt limit are cut at a character boundary and
/// suffixed with an ellipsis.
#[must_use]
pub fn body_excerpt(body: &str) -> String {
    let mut excerpt: String = body.chars().take(BODY_EXCERPT_MAX_CHARS).collect();
    if excerpt.len() < body.len() {
        excerpt.push_str("...");
    }
    excerpt
}

// =============================================================================
// Tests
// =============================================================================
