//! Core data types for exchange adapters
//!
//! Canonical records shared by every exchange integration: the ticker,
//! market metadata, balances and orders. Fields an exchange does not
//! provide are `None`, never a zero sentinel.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::constants;
use crate::config::HttpConfig;

// =============================================================================
// Shared HTTP Client Builder
// =============================================================================

/// Create a pooled HTTP client for one exchange
pub fn create_http_client(exchange_name: &str, http: &HttpConfig) -> reqwest::Client {
    let timeout = http.timeout();
    let connect_timeout = http.connect_timeout();
    let pool_max_idle = constants::http_pool_max_idle();

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(pool_max_idle)
        .pool_idle_timeout(constants::HTTP_POOL_IDLE_TIMEOUT)
        .tcp_keepalive(constants::HTTP_TCP_KEEPALIVE)
        .user_agent(constants::USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::info!(
        phase = "init",
        exchange = %exchange_name,
        timeout_ms = timeout.as_millis() as u64,
        connect_timeout_ms = connect_timeout.as_millis() as u64,
        pool_max_idle = pool_max_idle,
        "HTTP client configured"
    );
    client
}

// =============================================================================
// Value helpers
// =============================================================================

/// Read `key` as f64, accepting JSON numbers and numeric strings
pub fn safe_float(raw: &Value, key: &str) -> Option<f64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Read `key` as a string, stringifying numbers
pub fn safe_string(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2017-09-20T12:00:00.000Z`
pub fn iso8601(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// =============================================================================
// Market metadata
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub price: MinMax,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrecision {
    pub amount: Option<u32>,
    pub price: Option<u32>,
}

/// Market metadata: maps an exchange pair id to a unified symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Exchange pair id (e.g. "btc_usd")
    pub id: String,
    /// Unified symbol (e.g. "BTC/USD")
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub active: bool,
    pub maker: Option<f64>,
    pub taker: Option<f64>,
    pub precision: MarketPrecision,
    pub limits: MarketLimits,
}

impl MarketInfo {
    /// Minimal market record for a symbol (metadata unknown)
    pub fn new(id: &str, symbol: &str) -> Self {
        let (base, quote) = symbol.split_once('/').unwrap_or((symbol, ""));
        Self {
            id: id.to_string(),
            symbol: symbol.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
            active: true,
            maker: None,
            taker: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
        }
    }
}

// =============================================================================
// Canonical ticker
// =============================================================================

/// Canonical cross-exchange ticker record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: Option<String>,
    /// Unix milliseconds
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub vwap: Option<f64>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub first: Option<f64>,
    pub last: Option<f64>,
    pub change: Option<f64>,
    pub percentage: Option<f64>,
    pub average: Option<f64>,
    pub base_volume: Option<f64>,
    pub quote_volume: Option<f64>,
    /// Raw exchange payload, verbatim
    pub info: Value,
}

// =============================================================================
// Balances
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    /// Free amount per currency code
    pub free: BTreeMap<String, f64>,
    pub info: Value,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
}

/// Order to submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Unified symbol
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Limit price, required for limit orders
    pub price: Option<f64>,
    pub amount: f64,
}

impl OrderRequest {
    pub fn limit(symbol: &str, side: OrderSide, price: f64, amount: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            amount,
        }
    }
}

/// Order as reported by the exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: Option<String>,
    pub side: Option<OrderSide>,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub filled: Option<f64>,
    pub remaining: Option<f64>,
    pub status: OrderStatus,
    /// Unix milliseconds
    pub timestamp: Option<i64>,
    pub info: Value,
}
