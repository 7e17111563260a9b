//! Coinone REST API client.

use crate::error::CoinoneRestError;
use crate::responses::{
    Balance, BalanceResponse, OrderDetail, OrderDetailResponse, PlaceOrderResponse, Ticker,
    TickerResponse,
};
use auth::{ApiCredentials, RequestSigner};
use model::{Currency, CurrencyPair, OrderSide, OrderType};
use rest_client::{RestClient, RestError};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Production REST endpoint.
pub const COINONE_BASE_URL: &str = "https://api.coinone.co.kr";

/// Request timeout for Coinone API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Coinone REST API client with authentication support.
pub struct CoinoneRestClient {
    client: RestClient,
    credentials: ApiCredentials,
}

impl CoinoneRestClient {
    /// Create a client for the production API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: ApiCredentials) -> Result<Self, CoinoneRestError> {
        Self::with_base_url(credentials, COINONE_BASE_URL)
    }

    /// Create a client against an arbitrary base URL (used by tests).
    pub fn with_base_url(
        credentials: ApiCredentials,
        base_url: &str,
    ) -> Result<Self, CoinoneRestError> {
        let client = RestClient::new(base_url, REQUEST_TIMEOUT)?;
        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // ========================================================================
    // Market Data
    // ========================================================================

    /// Get the ticker for a market.
    ///
    /// GET /public/v2/ticker_new/{quote}/{target}
    pub async fn get_ticker(&self, pair: &CurrencyPair) -> Result<Ticker, CoinoneRestError> {
        let path = format!("/public/v2/ticker_new/{}/{}", pair.quote, pair.target);

        tracing::debug!(pair = %pair, "Fetching ticker");

        let value = self
            .client
            .get::<Value>(&path, Some("additional_data=false"), None)
            .await
            .map_err(map_rest_error)?;

        let response: TickerResponse = decode(value)?;
        response
            .tickers
            .into_iter()
            .next()
            .ok_or_else(|| CoinoneRestError::Parse(format!("no ticker returned for {}", pair)))
    }

    /// Lowest ask price of a market.
    pub async fn best_ask(&self, pair: &CurrencyPair) -> Result<Decimal, CoinoneRestError> {
        let ticker = self.get_ticker(pair).await?;
        let ask = ticker
            .best_asks
            .first()
            .map(|level| level.price)
            .ok_or_else(|| CoinoneRestError::EmptyOrderBook(pair.to_string()))?;

        tracing::debug!(pair = %pair, best_ask = %ask, "Best ask");
        Ok(ask)
    }

    // ========================================================================
    // Account
    // ========================================================================

    /// Get balances for the given currencies.
    ///
    /// POST /v2.1/account/balance
    pub async fn get_balances(
        &self,
        currencies: &[Currency],
    ) -> Result<Vec<Balance>, CoinoneRestError> {
        let mut params = Map::new();
        params.insert(
            "currencies".into(),
            json!(currencies.iter().map(Currency::as_str).collect::<Vec<_>>()),
        );

        let response: BalanceResponse = self.signed_post("/v2.1/account/balance", params).await?;
        Ok(response.balances)
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Place a market buy spending `amount` of the quote currency.
    ///
    /// POST /v2.1/order
    ///
    /// `limit_price` caps the price the market order may walk the book to.
    pub async fn place_market_buy(
        &self,
        pair: &CurrencyPair,
        amount: Decimal,
        limit_price: Option<Decimal>,
    ) -> Result<PlaceOrderResponse, CoinoneRestError> {
        let user_order_id = uuid::Uuid::new_v4().to_string();

        let mut params = pair_params(pair);
        params.insert("side".into(), json!(OrderSide::Buy.as_coinone_str()));
        params.insert("type".into(), json!(OrderType::Market.as_coinone_str()));
        params.insert("amount".into(), json!(amount.normalize().to_string()));
        if let Some(limit) = limit_price {
            params.insert("limit_price".into(), json!(limit.normalize().to_string()));
        }
        params.insert("user_order_id".into(), json!(user_order_id));

        tracing::info!(
            pair = %pair,
            amount = %amount,
            limit_price = ?limit_price,
            user_order_id = %user_order_id,
            "Placing market buy"
        );

        let response: PlaceOrderResponse = self.signed_post("/v2.1/order", params).await?;

        tracing::info!(order_id = %response.order_id, "Order placed");

        Ok(response)
    }

    /// Query an order by exchange order ID.
    ///
    /// POST /v2.1/order/detail
    pub async fn get_order_detail(
        &self,
        pair: &CurrencyPair,
        order_id: &str,
    ) -> Result<OrderDetail, CoinoneRestError> {
        let mut params = pair_params(pair);
        params.insert("order_id".into(), json!(order_id));

        let response: OrderDetailResponse = self.signed_post("/v2.1/order/detail", params).await?;

        tracing::debug!(
            order_id = %response.order.order_id,
            status = %response.order.status,
            "Order detail received"
        );

        Ok(response.order)
    }

    /// Sign `params` and POST them to `path`.
    async fn signed_post<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Map<String, Value>,
    ) -> Result<T, CoinoneRestError> {
        let signer = RequestSigner::new(&self.credentials);
        let signed = signer.sign_payload(params)?;

        let [payload, signature] = signed.headers();
        let headers = [("Content-Type", "application/json"), payload, signature];

        let value = self
            .client
            .post::<Value>(path, Some(signed.encoded.clone()), Some(&headers))
            .await
            .map_err(map_rest_error)?;

        decode(value)
    }
}

fn pair_params(pair: &CurrencyPair) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("quote_currency".into(), json!(pair.quote.as_str()));
    params.insert("target_currency".into(), json!(pair.target.as_str()));
    params
}

/// Check the response envelope, then decode the payload.
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CoinoneRestError> {
    CoinoneRestError::check_envelope(&value)?;
    serde_json::from_value(value).map_err(|e| CoinoneRestError::Parse(e.to_string()))
}

/// Prefer the exchange's own error when a non-2xx body carries one.
fn map_rest_error(err: RestError) -> CoinoneRestError {
    err.body()
        .and_then(CoinoneRestError::from_api_response)
        .unwrap_or(CoinoneRestError::Rest(err))
}

impl std::fmt::Debug for CoinoneRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinoneRestClient")
            .field("base_url", &self.client.base_url())
            .field("access_token", &self.credentials.access_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use rust_decimal_macros::dec;

    fn pair() -> CurrencyPair {
        CurrencyPair::new(Currency::krw(), Currency::btc())
    }

    fn client(url: &str) -> CoinoneRestClient {
        let creds = ApiCredentials::new("access".into(), "secret".into());
        CoinoneRestClient::with_base_url(creds, url).unwrap()
    }

    #[tokio::test]
    async fn test_best_ask() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/public/v2/ticker_new/KRW/BTC")
            .match_query(Matcher::UrlEncoded("additional_data".into(), "false".into()))
            .with_status(200)
            .with_body(
                r#"{"result":"success","error_code":"0","server_time":1,"tickers":[{
                    "quote_currency":"krw","target_currency":"btc","timestamp":1,"last":"100",
                    "best_asks":[{"price":"101","qty":"1"}],"best_bids":[{"price":"99","qty":"1"}]}]}"#,
            )
            .create_async()
            .await;

        let ask = client(&server.url()).best_ask(&pair()).await.unwrap();
        assert_eq!(ask, dec!(101));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_best_ask_empty_book() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/public/v2/ticker_new/KRW/BTC")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"result":"success","error_code":"0","server_time":1,"tickers":[{
                    "quote_currency":"krw","target_currency":"btc","timestamp":1,"last":"100",
                    "best_asks":[],"best_bids":[]}]}"#,
            )
            .create_async()
            .await;

        let err = client(&server.url()).best_ask(&pair()).await.unwrap_err();
        assert!(matches!(err, CoinoneRestError::EmptyOrderBook(_)));
    }

    #[tokio::test]
    async fn test_signed_post_sends_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.1/account/balance")
            .match_header("x-coinone-payload", Matcher::Regex("^[A-Za-z0-9+/=]+$".into()))
            .match_header("x-coinone-signature", Matcher::Regex("^[0-9a-f]{128}$".into()))
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(
                r#"{"result":"success","error_code":"0","balances":[
                    {"available":"5000","limit":"0","average_price":"0","currency":"KRW"}]}"#,
            )
            .create_async()
            .await;

        let balances = client(&server.url())
            .get_balances(&[Currency::krw(), Currency::btc()])
            .await
            .unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].available, dec!(5000));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_place_market_buy() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2.1/order")
            .with_status(200)
            .with_body(r#"{"result":"success","error_code":"0","order_id":"abc-123"}"#)
            .create_async()
            .await;

        let response = client(&server.url())
            .place_market_buy(&pair(), dec!(10000), Some(dec!(58205300)))
            .await
            .unwrap();

        assert_eq!(response.order_id, "abc-123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_on_http_200() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2.1/order")
            .with_status(200)
            .with_body(r#"{"result":"error","error_code":"103","error_msg":"Lack of Balance"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .place_market_buy(&pair(), dec!(10000), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoinoneRestError::LackOfBalance));
    }

    #[tokio::test]
    async fn test_api_error_on_http_4xx() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2.1/order/detail")
            .with_status(400)
            .with_body(r#"{"result":"error","error_code":"104","error_msg":"Order id is not exist"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .get_order_detail(&pair(), "nope")
            .await
            .unwrap_err();

        assert!(matches!(err, CoinoneRestError::OrderNotFound));
    }

    #[tokio::test]
    async fn test_plain_http_error_kept() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2.1/order/detail")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client(&server.url())
            .get_order_detail(&pair(), "x")
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", client("https://example.com"));
        assert!(debug.contains("access"));
        assert!(!debug.contains("secret"));
    }
}
