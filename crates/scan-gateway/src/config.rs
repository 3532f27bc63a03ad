//! Scan Gateway configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::credentials::DEFAULT_TOKEN_TTL;
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Maximum configurable cached-credential lifetime in seconds.
///
/// The pallet service issues tokens valid for 60 minutes; a longer cache
/// lifetime would serve tokens past their real expiry.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 3600;

/// Scan Gateway configuration.
///
/// Loaded from environment variables. The pallet service credentials are
/// required; absence is a fatal startup condition. The service account
/// password is redacted in Debug output to prevent credential leakage.
#[derive(Clone)]
pub struct Config {
    /// Pallet service base URL (e.g., "http://localhost:8000").
    pub pallet_api_base_url: String,

    /// Service account username for the pallet service login.
    pub pallet_api_username: String,

    /// Service account password for the pallet service login.
    pub pallet_api_password: SecretString,

    /// Server bind address (default: "0.0.0.0:8081").
    pub bind_address: String,

    /// Cached-credential lifetime in seconds (default: 3300 = 55 minutes).
    pub token_ttl_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("pallet_api_base_url", &self.pallet_api_base_url)
            .field("pallet_api_username", &self.pallet_api_username)
            .field("pallet_api_password", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token TTL configuration: {0}")]
    InvalidTokenTtl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let pallet_api_base_url = vars
            .get("PALLET_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("PALLET_API_BASE_URL".to_string()))?
            .clone();

        let pallet_api_username = vars
            .get("PALLET_API_USERNAME")
            .ok_or_else(|| ConfigError::MissingEnvVar("PALLET_API_USERNAME".to_string()))?
            .clone();

        let pallet_api_password = SecretString::from(
            vars.get("PALLET_API_PASSWORD")
                .ok_or_else(|| ConfigError::MissingEnvVar("PALLET_API_PASSWORD".to_string()))?
                .clone(),
        );

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        // Parse token TTL with validation
        let token_ttl_seconds = if let Some(value_str) = vars.get("SG_TOKEN_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTokenTtl(format!(
                    "SG_TOKEN_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTokenTtl(
                    "SG_TOKEN_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            if value > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidTokenTtl(format!(
                    "SG_TOKEN_TTL_SECONDS must not exceed {} seconds, got {}",
                    MAX_TOKEN_TTL_SECONDS, value
                )));
            }

            value
        } else {
            DEFAULT_TOKEN_TTL.as_secs()
        };

        Ok(Config {
            pallet_api_base_url,
            pallet_api_username,
            pallet_api_password,
            bind_address,
            token_ttl_seconds,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (
                "PALLET_API_BASE_URL".to_string(),
                "http://localhost:8000".to_string(),
            ),
            ("PALLET_API_USERNAME".to_string(), "dock-gateway".to_string()),
            ("PALLET_API_PASSWORD".to_string(), "test-password".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let vars = base_vars();

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.pallet_api_base_url, "http://localhost:8000");
        assert_eq!(config.pallet_api_username, "dock-gateway");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.token_ttl_seconds, DEFAULT_TOKEN_TTL.as_secs());
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert("SG_TOKEN_TTL_SECONDS".to_string(), "600".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.token_ttl_seconds, 600);
    }

    #[test]
    fn test_from_vars_missing_base_url() {
        let mut vars = base_vars();
        vars.remove("PALLET_API_BASE_URL");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "PALLET_API_BASE_URL"));
    }

    #[test]
    fn test_from_vars_missing_username() {
        let mut vars = base_vars();
        vars.remove("PALLET_API_USERNAME");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "PALLET_API_USERNAME"));
    }

    #[test]
    fn test_from_vars_missing_password() {
        let mut vars = base_vars();
        vars.remove("PALLET_API_PASSWORD");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "PALLET_API_PASSWORD"));
    }

    #[test]
    fn test_token_ttl_rejects_zero() {
        let mut vars = base_vars();
        vars.insert("SG_TOKEN_TTL_SECONDS".to_string(), "0".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTokenTtl(msg)) if msg.contains("must be greater than 0"))
        );
    }

    #[test]
    fn test_token_ttl_rejects_negative() {
        let mut vars = base_vars();
        vars.insert("SG_TOKEN_TTL_SECONDS".to_string(), "-300".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTokenTtl(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_token_ttl_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert(
            "SG_TOKEN_TTL_SECONDS".to_string(),
            "an-hour-ish".to_string(),
        );

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTokenTtl(msg)) if msg.contains("must be a valid positive integer"))
        );
    }

    #[test]
    fn test_token_ttl_rejects_too_large() {
        let mut vars = base_vars();
        vars.insert("SG_TOKEN_TTL_SECONDS".to_string(), "3601".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidTokenTtl(msg)) if msg.contains("must not exceed 3600"))
        );
    }

    #[test]
    fn test_token_ttl_accepts_max() {
        let mut vars = base_vars();
        vars.insert("SG_TOKEN_TTL_SECONDS".to_string(), "3600".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.token_ttl_seconds, 3600);
    }

    #[test]
    fn test_debug_redacts_password() {
        let vars = base_vars();
        let config = Config::from_vars(&vars).expect("Config should load successfully");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("test-password"));
        // Non-secret fields stay visible
        assert!(debug_output.contains("dock-gateway"));
        assert!(debug_output.contains("http://localhost:8000"));
    }
}
