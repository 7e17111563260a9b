//! Secure API credential management.
//!
//! Uses the `secrecy` crate to prevent accidental logging of secret keys
//! and ensures memory is zeroed on drop.

use crate::error::AuthError;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable holding the Coinone access token.
pub const ACCESS_KEY_VAR: &str = "API_ACCESS_KEY_COINONE";
/// Environment variable holding the Coinone secret key.
pub const SECRET_KEY_VAR: &str = "API_SECRET_KEY_COINONE";

/// API credentials for authenticated requests.
///
/// The secret key is wrapped in `SecretString` which:
/// - Prevents accidental Debug/Display printing
/// - Zeros memory on drop via zeroize
#[derive(Clone)]
pub struct ApiCredentials {
    access_token: String,
    secret_key: SecretString,
}

impl ApiCredentials {
    /// Load credentials from environment variables.
    ///
    /// Looks for:
    /// - `API_ACCESS_KEY_COINONE` - The access token (public)
    /// - `API_SECRET_KEY_COINONE` - The secret key (private)
    ///
    /// An empty value counts as missing: the scheduled workflow always
    /// injects both names even when the secret is unset.
    ///
    /// # Errors
    /// Returns `AuthError::MissingEnvVar` if either variable is not set.
    pub fn from_env() -> Result<Self, AuthError> {
        // Load .env file if present (ignores errors if file doesn't exist)
        dotenvy::dotenv().ok();

        let access_token = non_empty_var(ACCESS_KEY_VAR)?;
        let secret_key = non_empty_var(SECRET_KEY_VAR)?;

        Ok(Self::new(access_token, secret_key))
    }

    /// Create credentials from explicit values.
    ///
    /// Useful for testing or when credentials come from other sources.
    pub fn new(access_token: String, secret_key: String) -> Self {
        Self {
            access_token,
            secret_key: SecretString::from(secret_key),
        }
    }

    /// Get the access token (sent inside every signed payload).
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Expose the secret key for signing.
    ///
    /// **WARNING**: Only use this for cryptographic operations.
    /// Never log or display the return value.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

fn non_empty_var(name: &str) -> Result<String, AuthError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::MissingEnvVar(name.into()))
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("access_token", &self.access_token)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = ApiCredentials::new("my_access_token".into(), "my_secret".into());
        assert_eq!(creds.access_token(), "my_access_token");
        assert_eq!(creds.expose_secret(), "my_secret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ApiCredentials::new("my_access_token".into(), "super_secret_key".into());
        let debug_str = format!("{:?}", creds);

        assert!(debug_str.contains("my_access_token"));
        assert!(!debug_str.contains("super_secret_key"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_empty_var_is_missing() {
        std::env::set_var("AUTH_TEST_EMPTY_VAR", "  ");
        let err = non_empty_var("AUTH_TEST_EMPTY_VAR").unwrap_err();
        assert!(matches!(err, AuthError::MissingEnvVar(name) if name == "AUTH_TEST_EMPTY_VAR"));
    }

    #[test]
    fn test_unset_var_is_missing() {
        assert!(non_empty_var("AUTH_TEST_NEVER_SET_VAR").is_err());
    }
}
