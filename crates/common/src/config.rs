//! Auto-save run configuration.
//!
//! Every value comes from the environment. The scheduled workflow always
//! injects all of its variables, so a present-but-empty value is treated
//! the same as an unset one.

use chrono::NaiveTime;
use model::{Currency, CurrencyPair, InvalidCurrency};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

pub const WEBHOOK_VAR: &str = "DISCORD_WEBHOOK_URL";
pub const HOLD_CURRENCY_VAR: &str = "HOLD_CURRENCY";
pub const BUY_CURRENCY_VAR: &str = "BUY_CURRENCY";
pub const AMOUNT_VAR: &str = "AMOUNT";
pub const SLIPPAGE_VAR: &str = "MAX_SLIPPAGE_PCT";
pub const SCHEDULE_VAR: &str = "SCHEDULE_AT";
pub const DRY_RUN_VAR: &str = "DRY_RUN";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Currency(#[from] InvalidCurrency),
}

/// Configuration for one auto-save run (or the daemon loop).
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveConfig {
    /// `quote` is the hold currency spent; `target` is the currency bought.
    pub pair: CurrencyPair,
    /// Quote-currency amount spent per run.
    pub amount: Decimal,
    /// Cap on the market order price, in percent above the best ask.
    pub max_slippage_pct: Decimal,
    /// `None` disables Discord delivery.
    pub webhook_url: Option<String>,
    /// Daily fire time (UTC) for daemon mode.
    pub schedule_at: NaiveTime,
    pub dry_run: bool,
}

impl AutoSaveConfig {
    /// Build the configuration from process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let quote = match get(HOLD_CURRENCY_VAR) {
            Some(symbol) => Currency::new(&symbol)?,
            None => Currency::krw(),
        };
        let target = match get(BUY_CURRENCY_VAR) {
            Some(symbol) => Currency::new(&symbol)?,
            None => Currency::btc(),
        };
        if quote == target {
            return Err(ConfigError::Invalid {
                var: BUY_CURRENCY_VAR,
                value: target.to_string(),
                reason: "must differ from the hold currency".into(),
            });
        }

        let amount_raw = get(AMOUNT_VAR).ok_or(ConfigError::Missing(AMOUNT_VAR))?;
        let amount = parse_positive(AMOUNT_VAR, &amount_raw)?;

        let max_slippage_pct = match get(SLIPPAGE_VAR) {
            Some(raw) => {
                let pct = parse_decimal(SLIPPAGE_VAR, &raw)?;
                if pct.is_sign_negative() {
                    return Err(ConfigError::Invalid {
                        var: SLIPPAGE_VAR,
                        value: raw,
                        reason: "must not be negative".into(),
                    });
                }
                pct
            }
            None => Decimal::from(3),
        };

        let schedule_at = match get(SCHEDULE_VAR) {
            Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| {
                ConfigError::Invalid {
                    var: SCHEDULE_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => default_schedule(),
        };

        let dry_run = get(DRY_RUN_VAR)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            pair: CurrencyPair::new(quote, target),
            amount,
            max_slippage_pct,
            webhook_url: get(WEBHOOK_VAR),
            schedule_at,
            dry_run,
        })
    }

    pub fn hold_currency(&self) -> &Currency {
        &self.pair.quote
    }

    pub fn buy_currency(&self) -> &Currency {
        &self.pair.target
    }
}

fn default_schedule() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn parse_decimal(var: &'static str, raw: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(raw).map_err(|e| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_positive(var: &'static str, raw: &str) -> Result<Decimal, ConfigError> {
    let value = parse_decimal(var, raw)?;
    if value <= Decimal::ZERO {
        return Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(value)
}
