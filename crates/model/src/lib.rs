//! Exchange-agnostic domain types shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a currency symbol is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid currency symbol '{0}'")]
pub struct InvalidCurrency(pub String);

/// An upper-case currency ticker such as `KRW` or `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(symbol: &str) -> Result<Self, InvalidCurrency> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidCurrency(symbol.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Korean won, the quote currency of every Coinone market.
    pub fn krw() -> Self {
        Self("KRW".to_string())
    }

    pub fn btc() -> Self {
        Self("BTC".to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = InvalidCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = InvalidCurrency;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// A market: `target` is bought or sold, priced in `quote`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub quote: Currency,
    pub target: Currency,
}

impl CurrencyPair {
    pub fn new(quote: Currency, target: Currency) -> Self {
        Self { quote, target }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.target, self.quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire representation used by Coinone.
    pub fn as_coinone_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_coinone_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
        }
    }
}

/// Lifecycle state of an order as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Live,
    PartiallyFilled,
    Filled,
    Canceled,
    PartiallyCanceled,
    Unknown(String),
}

impl OrderStatus {
    /// Parse the exchange status string. Unrecognized values are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "LIVE" => Self::Live,
            "PARTIALLY_FILLED" => Self::PartiallyFilled,
            "FILLED" => Self::Filled,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "PARTIALLY_CANCELED" | "PARTIALLY_CANCELLED" => Self::PartiallyCanceled,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Whether the order can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Filled | Self::Canceled | Self::PartiallyCanceled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "LIVE"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::PartiallyCanceled => write!(f, "PARTIALLY_CANCELED"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_uppercases() {
        let c = Currency::new(" btc ").unwrap();
        assert_eq!(c.as_str(), "BTC");
        assert_eq!(c.to_string(), "BTC");
    }

    #[test]
    fn test_currency_rejects_empty_and_symbols() {
        assert!(Currency::new("").is_err());
        assert!(Currency::new("   ").is_err());
        assert!(Currency::new("BTC/KRW").is_err());
    }

    #[test]
    fn test_currency_deserializes_lowercase() {
        let c: Currency = serde_json::from_str(r#""eth""#).unwrap();
        assert_eq!(c, Currency::new("ETH").unwrap());
    }

    #[test]
    fn test_pair_display() {
        let pair = CurrencyPair::new(Currency::krw(), Currency::btc());
        assert_eq!(pair.to_string(), "BTC/KRW");
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("FILLED"), OrderStatus::Filled);
        assert_eq!(OrderStatus::parse("live"), OrderStatus::Live);
        assert_eq!(
            OrderStatus::parse("PARTIALLY_CANCELED"),
            OrderStatus::PartiallyCanceled
        );
        assert_eq!(
            OrderStatus::parse("WEIRD"),
            OrderStatus::Unknown("WEIRD".into())
        );
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(!OrderStatus::Live.is_terminal());
        assert!(!OrderStatus::PartiallyFilled.is_terminal());
        assert!(!OrderStatus::Unknown("X".into()).is_terminal());
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(OrderSide::Buy.as_coinone_str(), "BUY");
        assert_eq!(OrderType::Market.as_coinone_str(), "MARKET");
    }
}
