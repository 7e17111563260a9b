//! The auto-save job: one market buy per run, then a report.

use std::sync::Arc;
use std::time::Duration;

use coinone_rest::{CoinoneRestClient, CoinoneRestError, OrderDetail};
use common::{AutoSaveConfig, ExponentialBackoff};
use notifier::Notifier;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::dry_run::DryRunExecutor;
use crate::error::SaverError;
use crate::report;

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The exchange accepted the order. The detail carries its last known
    /// status, which may still be open after the polling budget ran out.
    Filled(OrderDetail),
    /// The exchange refused the order.
    Rejected { reason: String },
    /// Nothing was sent to the exchange.
    DryRun(OrderDetail),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Timing knobs for a run.
#[derive(Debug, Clone)]
pub struct SaverTiming {
    /// Wait between placing the order and the first detail lookup.
    pub settle_delay: Duration,
    /// Re-poll schedule while the order is not yet terminal.
    pub poll_backoff: ExponentialBackoff,
}

impl Default for SaverTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(1),
            poll_backoff: ExponentialBackoff::new(
                Duration::from_millis(500),
                Duration::from_secs(5),
                0.1,
            )
            .with_max_attempts(5),
        }
    }
}

/// Runs auto-save purchases against Coinone.
pub struct AutoSaver {
    client: CoinoneRestClient,
    notifier: Arc<dyn Notifier>,
    config: AutoSaveConfig,
    timing: SaverTiming,
}

impl AutoSaver {
    pub fn new(
        client: CoinoneRestClient,
        notifier: Arc<dyn Notifier>,
        config: AutoSaveConfig,
    ) -> Self {
        Self {
            client,
            notifier,
            config,
            timing: SaverTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: SaverTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.config
    }

    /// Perform one auto-save run.
    ///
    /// Failures before the order reaches the exchange are reported as a
    /// failed buy. Once the exchange has the order, later failures are
    /// reported without that wording, and a failed balance lookup only
    /// drops the holdings block from the report.
    pub async fn run_once(&self) -> Result<RunOutcome, SaverError> {
        let pair = &self.config.pair;
        let amount = self.config.amount;

        info!(
            pair = %pair,
            amount = %amount,
            dry_run = self.config.dry_run,
            "Starting auto-save run"
        );

        let best_ask = match self.client.best_ask(pair).await {
            Ok(best_ask) => best_ask,
            Err(e) => return Err(self.fail_before_order(e).await),
        };
        let limit_price = limit_price(best_ask, self.config.max_slippage_pct);

        info!(best_ask = %best_ask, limit_price = %limit_price, "Priced order");

        let (detail, dry_run) = if self.config.dry_run {
            let now_ms = chrono::Utc::now().timestamp_millis();
            let detail = DryRunExecutor::simulate_market_buy(pair, amount, best_ask, now_ms);
            (detail, true)
        } else {
            let order_id = match self
                .client
                .place_market_buy(pair, amount, Some(limit_price))
                .await
            {
                Ok(placed) => placed.order_id,
                Err(e) if is_rejection(&e) => {
                    warn!(error = %e, "Order rejected by exchange");
                    let reason = e.to_string();
                    self.notify(&report::order_failed_message(&pair.target, &reason))
                        .await;
                    return Ok(RunOutcome::Rejected { reason });
                }
                Err(e @ CoinoneRestError::Auth(_)) => return Err(self.fail_before_order(e).await),
                Err(e) => {
                    error!(error = %e, "Order request failed after sending");
                    self.notify(&report::order_unknown_message(&pair.target, &e.to_string()))
                        .await;
                    return Err(e.into());
                }
            };

            match self.await_order(&order_id).await {
                Ok(detail) => (detail, false),
                Err(source) => {
                    error!(order_id = %order_id, error = %source, "Order detail unavailable");
                    self.notify(&report::order_unconfirmed_message(&order_id, &source.to_string()))
                        .await;
                    return Err(SaverError::DetailUnavailable { order_id, source });
                }
            }
        };

        let message = match self
            .client
            .get_balances(&[pair.quote.clone(), pair.target.clone()])
            .await
        {
            Ok(balances) => report::order_received_message(&detail, &balances, dry_run),
            Err(e) => {
                warn!(error = %e, "Balance lookup failed, reporting order without holdings");
                report::order_received_without_holdings(&detail, &e.to_string(), dry_run)
            }
        };
        self.notify(&message).await;

        info!(
            order_id = %detail.order_id,
            status = %detail.status,
            executed_qty = %detail.executed_qty,
            "Auto-save run complete"
        );

        if dry_run {
            Ok(RunOutcome::DryRun(detail))
        } else {
            Ok(RunOutcome::Filled(detail))
        }
    }

    /// Report a failure that happened before any order was sent.
    async fn fail_before_order(&self, err: CoinoneRestError) -> SaverError {
        error!(error = %err, "Auto-save run failed");
        let err = SaverError::from(err);
        let message = report::order_failed_message(self.config.buy_currency(), &err.to_string());
        self.notify(&message).await;
        err
    }

    /// Fetch the order detail, re-polling while the order is still open.
    ///
    /// Retryable lookup failures share the polling budget.
    async fn await_order(&self, order_id: &str) -> Result<OrderDetail, CoinoneRestError> {
        let pair = &self.config.pair;
        let mut backoff = self.timing.poll_backoff.clone();
        backoff.reset();

        tokio::time::sleep(self.timing.settle_delay).await;

        loop {
            let detail = match self.client.get_order_detail(pair, order_id).await {
                Ok(detail) => detail,
                Err(e) if e.is_retryable() => match backoff.next_delay() {
                    Some(delay) => {
                        warn!(
                            order_id = %order_id,
                            error = %e,
                            retry_in_ms = delay.as_millis() as u64,
                            "Order detail lookup failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            };

            if detail.status.is_terminal() {
                return Ok(detail);
            }

            match backoff.next_delay() {
                Some(delay) => {
                    info!(
                        order_id = %order_id,
                        status = %detail.status,
                        retry_in_ms = delay.as_millis() as u64,
                        "Order still open"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!(order_id = %order_id, status = %detail.status, "Reporting open order");
                    return Ok(detail);
                }
            }
        }
    }

    /// Deliver a message; delivery failures are logged, never fatal.
    async fn notify(&self, message: &str) {
        if let Err(e) = self.notifier.send(message).await {
            error!(error = %e, "Failed to send notification");
        }
    }
}

/// Exchange answers that mean "the order was refused", as opposed to
/// transport failures.
fn is_rejection(err: &CoinoneRestError) -> bool {
    matches!(
        err,
        CoinoneRestError::ApiError { .. }
            | CoinoneRestError::LackOfBalance
            | CoinoneRestError::InvalidAccessToken
    )
}

/// Highest price the market order may fill at: the best ask raised by
/// `slippage_pct` percent, rounded up to a whole quote unit.
pub fn limit_price(best_ask: Decimal, slippage_pct: Decimal) -> Decimal {
    let factor = Decimal::ONE + slippage_pct / Decimal::ONE_HUNDRED;
    (best_ask * factor).ceil()
}
