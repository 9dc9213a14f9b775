//! Liqui payload normalisation
//!
//! Pure functions turning raw Liqui payloads into the canonical records.
//! None of them fail: missing or malformed fields become `None`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::adapters::types::{
    iso8601, safe_float, Balances, MarketInfo, MarketLimits, MarketPrecision, MinMax, Order,
    OrderSide, OrderStatus, Ticker,
};

use super::types::{LiquiActiveOrder, LiquiPair};

// =============================================================================
// Currency codes / symbols
// =============================================================================

/// Map exchange-specific currency codes to their common names
pub fn common_currency_code(code: &str) -> String {
    let upper = code.to_uppercase();
    match upper.as_str() {
        "XBT" => "BTC".to_string(),
        "BCC" => "BCH".to_string(),
        "DRK" => "DASH".to_string(),
        _ => upper,
    }
}

/// "btc_usd" -> ("BTC", "USD")
pub fn split_pair_id(id: &str) -> (String, String) {
    let (base, quote) = id.split_once('_').unwrap_or((id, ""));
    (common_currency_code(base), common_currency_code(quote))
}

// =============================================================================
// Markets
// =============================================================================

/// Build a market from one `info.pairs` entry
pub fn parse_market(id: &str, pair: &LiquiPair, maker: f64) -> MarketInfo {
    let (base, quote) = split_pair_id(id);
    MarketInfo {
        id: id.to_string(),
        symbol: format!("{}/{}", base, quote),
        base,
        quote,
        active: pair.hidden == 0,
        maker: Some(maker),
        taker: pair.fee.map(|percent| percent / 100.0),
        precision: MarketPrecision {
            amount: pair.decimal_places,
            price: pair.decimal_places,
        },
        limits: MarketLimits {
            amount: MinMax {
                min: pair.min_amount,
                max: pair.max_amount,
            },
            price: MinMax {
                min: pair.min_price,
                max: pair.max_price,
            },
        },
    }
}

// =============================================================================
// Tickers
// =============================================================================

/// Raw keys feeding the canonical bid/ask
///
/// Liqui clones disagree on which side `buy`/`sell` describe, everything
/// else in the ticker payload is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerFields {
    pub bid: &'static str,
    pub ask: &'static str,
}

pub const LIQUI_TICKER_FIELDS: TickerFields = TickerFields {
    bid: "buy",
    ask: "sell",
};

/// Normalise one ticker payload
pub fn normalize_ticker(raw: &Value, market: Option<&MarketInfo>, fields: &TickerFields) -> Ticker {
    let timestamp = safe_float(raw, "updated").map(|secs| (secs * 1000.0).round() as i64);

    Ticker {
        symbol: market.map(|m| m.symbol.clone()),
        timestamp,
        datetime: timestamp.and_then(iso8601),
        high: safe_float(raw, "high"),
        low: safe_float(raw, "low"),
        bid: safe_float(raw, fields.bid),
        ask: safe_float(raw, fields.ask),
        vwap: None,
        open: None,
        close: None,
        first: None,
        last: safe_float(raw, "last"),
        change: None,
        percentage: None,
        average: safe_float(raw, "avg"),
        base_volume: safe_float(raw, "vol_cur"),
        quote_volume: safe_float(raw, "vol"),
        info: raw.clone(),
    }
}

// =============================================================================
// Balances / orders
// =============================================================================

/// Balances from a getInfo response (`return.funds`)
pub fn parse_balance(response: &Value) -> Balances {
    let mut free = BTreeMap::new();
    if let Some(funds) = response.pointer("/return/funds").and_then(Value::as_object) {
        for (code, amount) in funds {
            let amount = match amount {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse::<f64>().ok(),
                _ => None,
            };
            if let Some(amount) = amount {
                free.insert(common_currency_code(code), amount);
            }
        }
    }
    Balances {
        free,
        info: response.clone(),
    }
}

/// Liqui order status codes: 0 active, 1 executed, 2/3 cancelled
pub fn parse_order_status(code: i64) -> OrderStatus {
    match code {
        0 => OrderStatus::Open,
        1 => OrderStatus::Closed,
        _ => OrderStatus::Canceled,
    }
}

pub fn parse_side(side: &str) -> Option<OrderSide> {
    match side {
        "buy" => Some(OrderSide::Buy),
        "sell" => Some(OrderSide::Sell),
        _ => None,
    }
}

/// Order from one ActiveOrders entry
///
/// Liqui reports the remaining amount as `amount`; fills are not visible.
pub fn parse_active_order(
    id: &str,
    order: &LiquiActiveOrder,
    market: Option<&MarketInfo>,
    info: Value,
) -> Order {
    let symbol = market
        .map(|m| m.symbol.clone())
        .unwrap_or_else(|| {
            let (base, quote) = split_pair_id(&order.pair);
            format!("{}/{}", base, quote)
        });

    Order {
        id: id.to_string(),
        symbol: Some(symbol),
        side: parse_side(&order.side),
        price: Some(order.rate),
        amount: Some(order.amount),
        filled: None,
        remaining: Some(order.amount),
        status: parse_order_status(order.status),
        timestamp: order.timestamp_created.map(|secs| secs * 1000),
        info,
    }
}
