use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required environment variable is missing or empty.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The secret key cannot be used as an HMAC key.
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// The payload could not be serialized.
    #[error("Payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
