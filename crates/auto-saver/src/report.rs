//! Human-readable run reports.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use coinone_rest::{Balance, OrderDetail};
use model::Currency;
use rust_decimal::Decimal;

const RECEIVED_HEADER: &str = "**===== 주문이 접수되었습니다 =====**";
const DRY_RUN_HEADER: &str = "**===== [DRY RUN] 모의 주문 결과 =====**";
const HOLDINGS_HEADER: &str = "=== 자산 별 보유 현황 ===";

/// Korea Standard Time, the exchange's local time.
fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Format with `,` thousands separators, trimming trailing fractional zeros.
pub fn format_thousands(value: Decimal) -> String {
    let normalized = value.normalize().to_string();
    let (sign, digits) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Format a whole-unit amount: truncated toward zero, then grouped.
pub fn format_whole(value: Decimal) -> String {
    format_thousands(value.trunc())
}

/// Render a millisecond timestamp in KST.
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc
            .with_timezone(&kst())
            .format("%Y-%m-%d %H:%M:%S KST")
            .to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Details of one executed order.
pub fn order_report(order: &OrderDetail) -> String {
    let quote = &order.quote_currency;
    let target = &order.target_currency;

    format!(
        "**[주문 ID]**\n{}\n\n\
         **[주문 시각]**\n{}\n\n\
         **[주문 가격]**\n{} {quote}\n\n\
         **[체결 수량]**\n{} {target}\n\n\
         **[체결 금액]**\n{} {quote}\n\n\
         **[주문 상태]**\n{}\n\n\
         **[수수료]**\n{} {quote}\n\n",
        order.order_id,
        format_timestamp_ms(order.ordered_at),
        format_whole(order.average_executed_price),
        order.executed_qty.normalize(),
        format_whole(order.traded_amount),
        order.status,
        format_thousands(order.fee),
    )
}

/// Holdings per currency, valued in `quote`.
///
/// The quote currency itself only shows its available amount.
pub fn holdings_report(balances: &[Balance], quote: &Currency) -> String {
    let mut report = String::from(HOLDINGS_HEADER);
    report.push('\n');

    for balance in balances {
        let currency = &balance.currency;
        report.push_str(&format!("\n**[{currency}]**\n"));
        report.push_str(&format!(
            "현재 보유량: {} {currency}\n",
            format_thousands(balance.available)
        ));

        if currency == quote {
            continue;
        }

        report.push_str(&format!(
            "매수 평균가: {} {quote}\n",
            format_thousands(balance.average_price)
        ));
        report.push_str(&format!(
            "총 보유 가치: {} {quote}\n",
            format_whole(balance.holding_value())
        ));
    }

    report
}

/// The message sent after an order was accepted.
pub fn order_received_message(order: &OrderDetail, balances: &[Balance], dry_run: bool) -> String {
    let header = if dry_run { DRY_RUN_HEADER } else { RECEIVED_HEADER };
    format!(
        "{header}\n\n{}\n{}",
        order_report(order),
        holdings_report(balances, &order.quote_currency)
    )
}

/// Same as [`order_received_message`] when the balance lookup failed:
/// the holdings block is replaced by a single line.
pub fn order_received_without_holdings(order: &OrderDetail, reason: &str, dry_run: bool) -> String {
    let header = if dry_run { DRY_RUN_HEADER } else { RECEIVED_HEADER };
    format!(
        "{header}\n\n{}\nholdings unavailable: {reason}\n",
        order_report(order)
    )
}

/// The message sent when the order was accepted but its detail could not
/// be fetched.
pub fn order_unconfirmed_message(order_id: &str, reason: &str) -> String {
    format!("order {order_id} placed, detail unavailable: {reason}. Check the exchange before buying again.")
}

/// The message sent when the order request failed in a way that does not
/// tell whether the exchange took it.
pub fn order_unknown_message(target: &Currency, reason: &str) -> String {
    format!("Order for {target} may have been placed: {reason}. Check the exchange before buying again.")
}

/// The message sent when the exchange refused the order.
pub fn order_failed_message(target: &Currency, reason: &str) -> String {
    format!("Failed to buy {target}: {reason}")
}
