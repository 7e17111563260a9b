//! Coinone REST API error types.

use auth::AuthError;
use rest_client::RestError;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with the Coinone REST API.
#[derive(Debug, Error)]
pub enum CoinoneRestError {
    /// REST client error (network, timeout, etc.).
    #[error("REST client error: {0}")]
    Rest(#[from] RestError),

    /// Authentication or signing error.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Coinone API error (returned by the exchange).
    #[error("Coinone API error {code}: {message}")]
    ApiError {
        /// Coinone error code.
        code: String,
        /// Error message.
        message: String,
    },

    /// The access token was rejected.
    #[error("Invalid access token")]
    InvalidAccessToken,

    /// Not enough funds in the hold currency.
    #[error("Insufficient balance")]
    LackOfBalance,

    #[error("Order not found")]
    OrderNotFound,

    /// The ticker had no ask side to price against.
    #[error("Order book for {0} has no asks")]
    EmptyOrderBook(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CoinoneRestError {
    /// Inspect a decoded response envelope.
    ///
    /// Coinone answers `{"result": "success", "error_code": "0", ...}` on success
    /// and `{"result": "error", "error_code": "107", "error_msg": "..."}` on failure,
    /// frequently with HTTP 200 in both cases.
    pub fn check_envelope(value: &Value) -> Result<(), Self> {
        let result = value.get("result").and_then(Value::as_str).unwrap_or_default();
        if result.eq_ignore_ascii_case("success") {
            return Ok(());
        }

        let code = match value.get("error_code") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::from("unknown"),
        };
        let message = value
            .get("error_msg")
            .and_then(Value::as_str)
            .unwrap_or(result)
            .to_string();

        Err(Self::classify_api_error(code, message))
    }

    /// Parse an error body returned alongside a non-2xx status.
    ///
    /// Falls back to `None` when the body is not a Coinone envelope.
    pub fn from_api_response(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        value.get("result")?;
        Self::check_envelope(&value).err()
    }

    /// Classify a Coinone error code into a more specific error.
    fn classify_api_error(code: String, message: String) -> Self {
        match code.as_str() {
            "12" => Self::InvalidAccessToken,
            "103" => Self::LackOfBalance,
            "104" => Self::OrderNotFound,
            _ => Self::ApiError { code, message },
        }
    }

    /// Check if this error indicates the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rest(rest_err) => rest_err.is_retryable(),
            _ => false,
        }
    }
}
