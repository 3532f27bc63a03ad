//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with gateway-specific
//! guidance. Use these types for all sensitive values like the service account
//! password and the bearer tokens issued by the pallet service.
//!
//! # Compile-Time Safety
//!
//! The key insight is that `SecretBox<T>` and `SecretString` implement `Debug`
//! with redaction, so any code that derives `Debug` on a struct containing secrets
//! will automatically get safe logging behavior. This makes it **impossible** to
//! accidentally log secrets via `{:?}` or tracing.
//!
//! # Memory Safety
//!
//! Secrets are automatically zeroized when dropped, preventing sensitive
//! data from lingering in memory after use.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     username: String,
//!     password: SecretString,  // Safe: Debug shows "[REDACTED]"
//! }
//!
//! let form = LoginForm {
//!     username: "dock-gateway".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! // This is safe - password is redacted
//! println!("{:?}", form);
//!
//! // To access the actual value, you must explicitly call expose_secret()
//! let password: &str = form.password.expose_secret();
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - The service account password
//! - Bearer tokens issued by the pallet service
//! - Any future API keys
//!
//! Use `SecretBox<T>` for:
//! - Custom secret types (e.g., `SecretBox<[u8]>` for binary keys)
//!
//! # Serde Integration
//!
//! With the `serde` feature enabled, secrets can be deserialized from JSON:
//!
//! ```rust
//! use serde::Deserialize;
//! use common::secret::SecretString;
//!
//! #[derive(Debug, Deserialize)]
//! struct ServiceAccount {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let json = r#"{"username": "dock-gateway", "password": "secret-key"}"#;
//! let account: ServiceAccount = serde_json::from_str(json).unwrap();
//!
//! // Debug output is safe
//! println!("{:?}", account);
//! // username is visible, password is redacted
//! ```

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("hunter2");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("forklift-42");
        assert_eq!(secret.expose_secret(), "forklift-42");
    }

    #[test]
    fn test_struct_with_secret_is_safe() {
        #[allow(dead_code)]
        #[derive(Debug)]
        struct ServiceAccount {
            username: String,
            password: SecretString,
        }

        let account = ServiceAccount {
            username: "dock-gateway".to_string(),
            password: SecretString::from("super-secret"),
        };

        let debug_str = format!("{account:?}");

        // Username should be visible
        assert!(debug_str.contains("dock-gateway"));
        // Password should be redacted
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super-secret"));
    }

    #[test]
    fn test_deserialize() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct ServiceAccount {
            username: String,
            password: SecretString,
        }

        let json = r#"{"username": "dock-gateway", "password": "my-secret-value"}"#;
        let account: ServiceAccount = serde_json::from_str(json).expect("deserialize");

        // Verify we can access the secret
        assert_eq!(account.password.expose_secret(), "my-secret-value");

        // Verify debug doesn't expose the value
        let debug = format!("{account:?}");
        assert!(!debug.contains("my-secret-value"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
