//! Generic REST client wrapper around reqwest.

use crate::error::RestError;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic REST client for making HTTP requests.
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new REST client with the given base URL.
    ///
    /// # Arguments
    /// * `base_url` - Base URL for all requests (e.g., "https://api.coinone.co.kr")
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestError::RequestBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new REST client with default timeout.
    pub fn with_default_timeout(base_url: &str) -> Result<Self, RestError> {
        Self::new(base_url, DEFAULT_TIMEOUT)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request.
    ///
    /// # Arguments
    /// * `path` - Request path (e.g., "/public/v2/ticker_new/KRW/BTC")
    /// * `query` - Optional query string (without leading '?')
    /// * `headers` - Optional additional headers
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<T, RestError> {
        let url = self.build_url(path, query);
        tracing::debug!(url = %url, "GET request");

        let request = with_headers(self.client.get(&url), headers);
        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Make a POST request.
    ///
    /// # Arguments
    /// * `path` - Request path
    /// * `body` - Optional raw request body
    /// * `headers` - Optional additional headers
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<String>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<T, RestError> {
        let url = self.build_url(path, None);
        tracing::debug!(url = %url, "POST request");

        let response = self.send_post(&url, body, headers).await?;
        self.handle_response(response).await
    }

    /// Make a POST request whose response body is ignored.
    ///
    /// Returns the HTTP status code on success so callers can tell
    /// `204 No Content` apart from other 2xx answers.
    pub async fn post_empty(
        &self,
        path: &str,
        body: Option<String>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<u16, RestError> {
        let url = self.build_url(path, None);
        tracing::debug!(url = %url, "POST request (empty response)");

        let response = self.send_post(&url, body, headers).await?;
        self.handle_empty_response(response).await
    }

    async fn send_post(
        &self,
        url: &str,
        body: Option<String>,
        headers: Option<&[(&str, &str)]>,
    ) -> Result<Response, RestError> {
        let mut request = with_headers(self.client.post(url), headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }

    /// Build a full URL from path and optional query string.
    fn build_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, path, q),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    /// Handle HTTP response and deserialize JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, RestError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                tracing::warn!(body = %body, error = %e, "Failed to parse response");
                RestError::Parse(e.to_string())
            })
        } else {
            let retry_after_ms = retry_after_ms(&response);
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(RestError::RateLimited { retry_after_ms });
            }

            Err(RestError::HttpError {
                status: status.as_u16(),
                message: body,
            })
        }
    }

    /// Handle HTTP response for endpoints that return empty body.
    async fn handle_empty_response(&self, response: Response) -> Result<u16, RestError> {
        let status = response.status();

        if status.is_success() {
            Ok(status.as_u16())
        } else {
            let retry_after_ms = retry_after_ms(&response);
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(RestError::RateLimited { retry_after_ms });
            }

            Err(RestError::HttpError {
                status: status.as_u16(),
                message: body,
            })
        }
    }
}

fn with_headers(mut request: RequestBuilder, headers: Option<&[(&str, &str)]>) -> RequestBuilder {
    if let Some(hdrs) = headers {
        for (key, value) in hdrs {
            request = request.header(*key, *value);
        }
    }
    request
}

/// Read `Retry-After` (seconds), defaulting to 60 seconds.
fn retry_after_ms(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
        .unwrap_or(60_000)
}
