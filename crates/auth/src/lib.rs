//! Authentication and signing for the Coinone API.
//!
//! This crate provides secure credential management and request signing
//! for authenticated API calls.
//!
//! # Features
//!
//! - **Secure Credentials**: API secrets are wrapped in `SecretString` to prevent
//!   accidental logging and ensure memory is zeroed on drop.
//! - **HMAC-SHA512 Signing**: Base64 JSON payload plus hex signature, as Coinone
//!   API v2.1 expects.
//! - **Environment Loading**: Credentials can be loaded from environment variables
//!   or a `.env` file.
//!
//! # Example
//!
//! ```rust,ignore
//! use auth::{ApiCredentials, RequestSigner};
//!
//! let credentials = ApiCredentials::from_env()?;
//! let signer = RequestSigner::new(&credentials);
//!
//! let signed = signer.sign_payload(serde_json::Map::new())?;
//! for (name, value) in signed.headers() {
//!     request = request.header(name, value);
//! }
//! ```

mod credentials;
mod error;
mod signer;

pub use credentials::{ApiCredentials, ACCESS_KEY_VAR, SECRET_KEY_VAR};
pub use error::AuthError;
pub use signer::{RequestSigner, SignedPayload, PAYLOAD_HEADER, SIGNATURE_HEADER};
