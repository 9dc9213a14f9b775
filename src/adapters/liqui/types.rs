//! Liqui API response types
//!
//! Docs: https://liqui.io/api
//!
//! `info` lists every pair with its precision, limits and taker fee (in
//! percent). Private calls wrap their payload in `{"success": 1, "return": ..}`.

use std::collections::BTreeMap;

use serde::Deserialize;

// =============================================================================
// Public: info
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LiquiInfo {
    #[serde(default)]
    pub server_time: Option<i64>,
    #[serde(default)]
    pub pairs: BTreeMap<String, LiquiPair>,
}

/// One entry of `info.pairs`, keyed by pair id ("btc_usd")
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiquiPair {
    pub decimal_places: Option<u32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Taker fee in percent (0.2 == 0.2%)
    pub fee: Option<f64>,
    /// 1 when the pair is delisted from the UI
    pub hidden: u8,
}

// =============================================================================
// Private: Trade / ActiveOrders
// =============================================================================

/// `return` of a Trade call
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LiquiTradeResult {
    pub received: f64,
    pub remains: f64,
    /// 0 when the order filled immediately
    pub order_id: u64,
}

/// One entry of the ActiveOrders `return` map, keyed by order id
#[derive(Debug, Clone, Deserialize)]
pub struct LiquiActiveOrder {
    pub pair: String,
    #[serde(rename = "type")]
    pub side: String,
    pub amount: f64,
    pub rate: f64,
    #[serde(default)]
    pub timestamp_created: Option<i64>,
    #[serde(default)]
    pub status: i64,
}
