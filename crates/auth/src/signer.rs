//! HMAC-SHA512 request signing for the Coinone private API.
//!
//! A private request carries its parameters as a JSON object that also holds
//! the access token and a one-time nonce. The object is base64-encoded into
//! `X-COINONE-PAYLOAD` and the encoded bytes are signed into
//! `X-COINONE-SIGNATURE`.

use crate::credentials::ApiCredentials;
use crate::error::AuthError;
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the base64 payload.
pub const PAYLOAD_HEADER: &str = "X-COINONE-PAYLOAD";
/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "X-COINONE-SIGNATURE";

/// An encoded payload together with its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub encoded: String,
    pub signature: String,
}

impl SignedPayload {
    /// Header pairs to attach to the request.
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (PAYLOAD_HEADER, self.encoded.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }
}

/// Request signer for authenticated Coinone API calls.
pub struct RequestSigner<'a> {
    credentials: &'a ApiCredentials,
}

impl<'a> RequestSigner<'a> {
    /// Create a new request signer with the given credentials.
    pub fn new(credentials: &'a ApiCredentials) -> Self {
        Self { credentials }
    }

    /// Sign a message and return the hex-encoded signature.
    ///
    /// This computes HMAC-SHA512 of the message using the secret key
    /// and returns the result as a lowercase hex string.
    pub fn sign(&self, message: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha512::new_from_slice(self.credentials.expose_secret().as_bytes())
            .map_err(|_| AuthError::InvalidSecretKey)?;

        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Add the access token and `nonce` to `params`, then serialize and
    /// base64-encode the object.
    ///
    /// Keys are serialized in sorted order.
    pub fn encode_payload(
        &self,
        mut params: Map<String, Value>,
        nonce: &str,
    ) -> Result<String, AuthError> {
        params.insert(
            "access_token".into(),
            Value::String(self.credentials.access_token().to_string()),
        );
        params.insert("nonce".into(), Value::String(nonce.to_string()));

        let json = serde_json::to_string(&Value::Object(params))?;
        Ok(general_purpose::STANDARD.encode(json.as_bytes()))
    }

    /// Encode and sign `params` with a fresh UUID v4 nonce.
    pub fn sign_payload(&self, params: Map<String, Value>) -> Result<SignedPayload, AuthError> {
        let nonce = uuid::Uuid::new_v4().to_string();
        self.sign_payload_with_nonce(params, &nonce)
    }

    /// Encode and sign `params` with an explicit nonce.
    pub fn sign_payload_with_nonce(
        &self,
        params: Map<String, Value>,
        nonce: &str,
    ) -> Result<SignedPayload, AuthError> {
        let encoded = self.encode_payload(params, nonce)?;
        let signature = self.sign(&encoded)?;
        Ok(SignedPayload { encoded, signature })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONCE: &str = "00000000-0000-4000-8000-000000000000";

    fn creds() -> ApiCredentials {
        ApiCredentials::new("test-access".into(), "test-secret".into())
    }

    #[test]
    fn test_encode_payload_adds_token_and_nonce() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);

        let encoded = signer.encode_payload(Map::new(), NONCE).unwrap();
        assert_eq!(
            encoded,
            "eyJhY2Nlc3NfdG9rZW4iOiJ0ZXN0LWFjY2VzcyIsIm5vbmNlIjoiMDAwMDAwMDAtMDAwMC00MDAwLTgwMDAtMDAwMDAwMDAwMDAwIn0="
        );

        let decoded = general_purpose::STANDARD.decode(&encoded).unwrap();
        let value: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value["access_token"], "test-access");
        assert_eq!(value["nonce"], NONCE);
    }

    #[test]
    fn test_sign_known_vector() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);

        let signed = signer.sign_payload_with_nonce(Map::new(), NONCE).unwrap();
        assert_eq!(
            signed.signature,
            "11e1c27e98a445be28231f3c3620699df32d978744f51108dcbed0de16cc987679936720f1c4e8c251a4e350c58ece83a47635845afaee63886ad683f6fa34e5"
        );
    }

    #[test]
    fn test_sign_empty_message() {
        let creds = ApiCredentials::new("key".into(), "secret".into());
        let signer = RequestSigner::new(&creds);

        assert_eq!(
            signer.sign("").unwrap(),
            "b0e9650c5faf9cd8ae02276671545424104589b3656731ec193b25d01b07561c27637c2d4d68389d6cf5007a8632c26ec89ba80a01c77a6cdd389ec28db43901"
        );
    }

    #[test]
    fn test_params_survive_encoding() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);

        let mut params = Map::new();
        params.insert("currencies".into(), serde_json::json!(["KRW", "BTC"]));
        let encoded = signer.encode_payload(params, NONCE).unwrap();

        let decoded = general_purpose::STANDARD.decode(&encoded).unwrap();
        let value: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(value["currencies"], serde_json::json!(["KRW", "BTC"]));
    }

    #[test]
    fn test_fresh_nonce_per_payload() {
        let creds = creds();
        let signer = RequestSigner::new(&creds);

        let a = signer.sign_payload(Map::new()).unwrap();
        let b = signer.sign_payload(Map::new()).unwrap();
        assert_ne!(a.encoded, b.encoded);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_headers() {
        let signed = SignedPayload {
            encoded: "abc".into(),
            signature: "def".into(),
        };
        let headers = signed.headers();
        assert_eq!(headers[0], ("X-COINONE-PAYLOAD", "abc"));
        assert_eq!(headers[1], ("X-COINONE-SIGNATURE", "def"));
    }
}
