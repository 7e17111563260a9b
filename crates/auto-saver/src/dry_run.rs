//! Dry run executor for simulated order fills.

use std::sync::atomic::{AtomicU64, Ordering};

use coinone_rest::OrderDetail;
use model::{CurrencyPair, OrderSide, OrderStatus, OrderType};
use rust_decimal::{Decimal, RoundingStrategy};

/// Counter for generating unique simulated order IDs.
static SIMULATED_ORDER_ID: AtomicU64 = AtomicU64::new(1);

/// Coinone's default taker fee rate (0.2%).
const SIMULATED_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

/// Target quantity precision used for simulated fills.
const QTY_DECIMALS: u32 = 8;

/// Fabricates order details for dry-run mode so the report path can be
/// exercised without sending orders to the exchange.
pub struct DryRunExecutor;

impl DryRunExecutor {
    /// Simulate a market buy of `amount` quote currency, fully filled at `price`.
    ///
    /// The fee is charged in the quote currency and reduces the filled quantity.
    pub fn simulate_market_buy(
        pair: &CurrencyPair,
        amount: Decimal,
        price: Decimal,
        timestamp_ms: i64,
    ) -> OrderDetail {
        let fee = (amount * SIMULATED_FEE_RATE).round_dp(2);
        let executed_qty = if price.is_zero() {
            Decimal::ZERO
        } else {
            ((amount - fee) / price)
                .round_dp_with_strategy(QTY_DECIMALS, RoundingStrategy::ToZero)
        };

        let id = SIMULATED_ORDER_ID.fetch_add(1, Ordering::Relaxed);

        OrderDetail {
            order_id: format!("dry-run-{id}"),
            order_type: OrderType::Market.as_coinone_str().to_string(),
            side: OrderSide::Buy.as_coinone_str().to_string(),
            quote_currency: pair.quote.clone(),
            target_currency: pair.target.clone(),
            status: OrderStatus::Filled,
            ordered_at: timestamp_ms,
            updated_at: Some(timestamp_ms),
            average_executed_price: price,
            executed_qty,
            traded_amount: amount,
            fee,
            fee_rate: SIMULATED_FEE_RATE,
            user_order_id: None,
        }
    }
}
