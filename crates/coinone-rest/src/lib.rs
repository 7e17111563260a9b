//! Coinone REST API client.
//!
//! This crate provides a typed client for the Coinone public and private
//! (v2.1) REST API with:
//!
//! - **Signed requests**: HMAC-SHA512 over a base64 JSON payload carrying a nonce
//! - **Market data**: ticker and best ask
//! - **Account**: balances per currency
//! - **Order management**: market buys and order detail lookup
//! - **Error handling**: the `result`/`error_code` envelope mapped to typed errors
//!
//! # Example
//!
//! ```rust,ignore
//! use auth::ApiCredentials;
//! use coinone_rest::CoinoneRestClient;
//!
//! let client = CoinoneRestClient::new(ApiCredentials::from_env()?)?;
//! let ask = client.best_ask(&pair).await?;
//! let order = client.place_market_buy(&pair, dec!(10000), Some(ask * dec!(1.03))).await?;
//! let detail = client.get_order_detail(&pair, &order.order_id).await?;
//! ```

mod client;
mod error;
mod responses;

pub use client::{CoinoneRestClient, COINONE_BASE_URL};
pub use error::CoinoneRestError;
pub use responses::{
    Balance, BalanceResponse, OrderDetail, OrderDetailResponse, PlaceOrderResponse, PriceLevel,
    Ticker, TickerResponse,
};
