//! Coinone API response types.
//!
//! Coinone encodes prices and quantities as JSON strings. Timestamps are
//! milliseconds since the Unix epoch.

use model::{Currency, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// One price level of the ticker's best bid/ask lists.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceLevel {
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub price: Decimal,
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub qty: Decimal,
}

/// A market snapshot from GET /public/v2/ticker_new.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub quote_currency: Currency,
    pub target_currency: Currency,
    pub timestamp: i64,
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub last: Decimal,
    #[serde(default)]
    pub best_asks: Vec<PriceLevel>,
    #[serde(default)]
    pub best_bids: Vec<PriceLevel>,
}

/// Response from GET /public/v2/ticker_new/{quote}/{target}.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    pub server_time: i64,
    pub tickers: Vec<Ticker>,
}

/// Holding of a single currency.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub currency: Currency,
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub available: Decimal,
    /// Amount locked in open orders.
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub limit: Decimal,
    #[serde(deserialize_with = "decimal_from_str_or_num")]
    pub average_price: Decimal,
}

impl Balance {
    /// Value of the available amount at the average buy price.
    pub fn holding_value(&self) -> Decimal {
        self.available * self.average_price
    }
}

/// Response from POST /v2.1/account/balance.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    pub balances: Vec<Balance>,
}

/// Response from POST /v2.1/order.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderResponse {
    pub order_id: String,
}

/// Order state from POST /v2.1/order/detail.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetail {
    pub order_id: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    pub quote_currency: Currency,
    pub target_currency: Currency,
    #[serde(deserialize_with = "status_from_str")]
    pub status: OrderStatus,
    pub ordered_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default, deserialize_with = "decimal_from_str_or_num")]
    pub average_executed_price: Decimal,
    #[serde(default, deserialize_with = "decimal_from_str_or_num")]
    pub executed_qty: Decimal,
    #[serde(default, deserialize_with = "decimal_from_str_or_num")]
    pub traded_amount: Decimal,
    #[serde(default, deserialize_with = "decimal_from_str_or_num")]
    pub fee: Decimal,
    #[serde(default, deserialize_with = "decimal_from_str_or_num")]
    pub fee_rate: Decimal,
    #[serde(default)]
    pub user_order_id: Option<String>,
}

/// Response wrapper for the order detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetailResponse {
    pub order: OrderDetail,
}

fn status_from_str<'de, D>(deserializer: D) -> Result<OrderStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(OrderStatus::parse(&s))
}

/// Deserialize a Decimal from a JSON string, number or null (as zero).
fn decimal_from_str_or_num<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Str(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Raw::Str(s) => s.trim().parse::<Decimal>().map_err(serde::de::Error::custom),
        Raw::Num(n) => n
            .to_string()
            .parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(serde::de::Error::custom),
        Raw::Null => Ok(Decimal::ZERO),
    }
}
