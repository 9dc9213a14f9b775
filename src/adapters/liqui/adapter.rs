//! Liqui-family exchange client
//!
//! One adapter serves every exchange speaking the Liqui API; clones differ
//! only by descriptor and by their ticker field mapping.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::adapters::descriptor::ExchangeDescriptor;
use crate::adapters::dispatcher::{Dispatcher, Params};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::ExchangeClient;
use crate::adapters::types::{Balances, MarketInfo, Order, OrderRequest, OrderStatus, OrderType, Ticker};

use super::parse::{normalize_ticker, parse_active_order, parse_balance, parse_market, TickerFields};
use super::types::{LiquiActiveOrder, LiquiInfo, LiquiTradeResult};

/// Longest `-`-joined pair list accepted in one ticker URL
const MAX_TICKER_IDS_LEN: usize = 2048;

fn current_time_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Default)]
struct MarketCache {
    by_symbol: HashMap<String, MarketInfo>,
    /// pair id -> symbol
    symbols: HashMap<String, String>,
}

impl MarketCache {
    fn from_markets(markets: Vec<MarketInfo>) -> Self {
        let mut cache = Self::default();
        for market in markets {
            cache.symbols.insert(market.id.clone(), market.symbol.clone());
            cache.by_symbol.insert(market.symbol.clone(), market);
        }
        cache
    }

    fn by_id(&self, id: &str) -> Option<&MarketInfo> {
        self.symbols.get(id).and_then(|symbol| self.by_symbol.get(symbol))
    }

    fn sorted(&self) -> Vec<MarketInfo> {
        let mut markets: Vec<MarketInfo> = self.by_symbol.values().cloned().collect();
        markets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        markets
    }
}

pub struct LiquiAdapter {
    dispatcher: Dispatcher,
    ticker_fields: TickerFields,
    markets: RwLock<MarketCache>,
}

impl LiquiAdapter {
    pub fn new(dispatcher: Dispatcher, ticker_fields: TickerFields) -> Self {
        Self {
            dispatcher,
            ticker_fields,
            markets: RwLock::new(MarketCache::default()),
        }
    }

    pub fn ticker_fields(&self) -> TickerFields {
        self.ticker_fields
    }

    fn id(&self) -> &str {
        &self.dispatcher.descriptor().id
    }

    async fn market(&self, symbol: &str) -> ExchangeResult<MarketInfo> {
        self.load_markets(false).await?;
        self.markets
            .read()
            .await
            .by_symbol
            .get(symbol)
            .cloned()
            .ok_or_else(|| {
                ExchangeError::BadRequest(format!("{} does not have market symbol {}", self.id(), symbol))
            })
    }

    fn require(&self, supported: bool, operation: &str) -> ExchangeResult<()> {
        if supported {
            Ok(())
        } else {
            Err(ExchangeError::NotSupported(format!("{} {}", self.id(), operation)))
        }
    }
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

/// Format `value` with at most `precision` decimals, trailing zeros trimmed
fn to_precision(value: f64, precision: Option<u32>) -> String {
    match precision {
        Some(digits) => {
            let text = format!("{:.*}", digits as usize, value);
            if text.contains('.') {
                text.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                text
            }
        }
        None => value.to_string(),
    }
}

/// Cut `value` to at most `precision` decimals without rounding up
///
/// Order amounts must never exceed what the caller asked for.
fn truncate_to_precision(value: f64, precision: Option<u32>) -> String {
    let text = value.to_string();
    let digits = match precision {
        Some(digits) => digits as usize,
        None => return text,
    };
    match text.find('.') {
        Some(dot) => {
            let end = if digits == 0 { dot } else { (dot + 1 + digits).min(text.len()) };
            let cut = &text[..end];
            if cut.contains('.') {
                cut.trim_end_matches('0').trim_end_matches('.').to_string()
            } else {
                cut.to_string()
            }
        }
        None => text,
    }
}

#[async_trait]
impl ExchangeClient for LiquiAdapter {
    fn exchange_id(&self) -> &str {
        self.id()
    }

    fn descriptor(&self) -> &ExchangeDescriptor {
        self.dispatcher.descriptor()
    }

    fn has_credentials(&self) -> bool {
        self.dispatcher.has_credentials()
    }

    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<MarketInfo>> {
        if !reload {
            let cache = self.markets.read().await;
            if !cache.by_symbol.is_empty() {
                return Ok(cache.sorted());
            }
        }

        let response = self.dispatcher.public_get("info", Params::new()).await?;
        let info: LiquiInfo = serde_json::from_value(response)
            .map_err(|e| ExchangeError::InvalidResponse(format!("{} info: {}", self.id(), e)))?;

        let maker = self.descriptor().fees.trading.maker;
        let markets: Vec<MarketInfo> = info
            .pairs
            .iter()
            .map(|(id, pair)| parse_market(id, pair, maker))
            .collect();

        tracing::info!(exchange = %self.id(), markets = markets.len(), "Markets loaded");

        let cache = MarketCache::from_markets(markets);
        let sorted = cache.sorted();
        *self.markets.write().await = cache;
        Ok(sorted)
    }

    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let market = self.market(symbol).await?;
        let response = self
            .dispatcher
            .public_get("ticker/{pair}", params(json!({"pair": &market.id})))
            .await?;

        let raw = response.get(&market.id).ok_or_else(|| {
            ExchangeError::InvalidResponse(format!("{} ticker response lacks {}", self.id(), market.id))
        })?;
        Ok(normalize_ticker(raw, Some(&market), &self.ticker_fields))
    }

    async fn fetch_tickers(
        &self,
        symbols: Option<&[String]>,
    ) -> ExchangeResult<BTreeMap<String, Ticker>> {
        self.require(self.descriptor().has.fetch_tickers, "fetchTickers")?;
        self.load_markets(false).await?;

        let ids: Vec<String> = {
            let cache = self.markets.read().await;
            match symbols {
                Some(symbols) => symbols
                    .iter()
                    .map(|symbol| {
                        cache.by_symbol.get(symbol).map(|m| m.id.clone()).ok_or_else(|| {
                            ExchangeError::BadRequest(format!(
                                "{} does not have market symbol {}",
                                self.id(),
                                symbol
                            ))
                        })
                    })
                    .collect::<ExchangeResult<_>>()?,
                None => {
                    let mut ids: Vec<String> = cache
                        .by_symbol
                        .values()
                        .filter(|m| m.active)
                        .map(|m| m.id.clone())
                        .collect();
                    ids.sort();
                    ids
                }
            }
        };

        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let joined = ids.join("-");
        if joined.len() > MAX_TICKER_IDS_LEN {
            return Err(ExchangeError::BadRequest(format!(
                "{} has {} symbols exceeding max URL length, pass a shorter symbols list",
                self.id(),
                ids.len()
            )));
        }

        let response = self
            .dispatcher
            .public_get("ticker/{pair}", params(json!({"pair": joined})))
            .await?;

        let cache = self.markets.read().await;
        let mut tickers = BTreeMap::new();
        if let Some(entries) = response.as_object() {
            for (id, raw) in entries {
                match cache.by_id(id) {
                    Some(market) => {
                        let ticker = normalize_ticker(raw, Some(market), &self.ticker_fields);
                        tickers.insert(market.symbol.clone(), ticker);
                    }
                    None => {
                        tracing::debug!(exchange = %self.id(), pair = %id, "Ticker for unknown pair skipped")
                    }
                }
            }
        }
        Ok(tickers)
    }

    async fn fetch_balance(&self) -> ExchangeResult<Balances> {
        self.require(self.descriptor().has.fetch_balance, "fetchBalance")?;
        let response = self.dispatcher.private_post("getInfo", Params::new()).await?;
        Ok(parse_balance(&response))
    }

    async fn create_order(&self, order: OrderRequest) -> ExchangeResult<Order> {
        self.require(self.descriptor().has.create_order, "createOrder")?;
        if order.order_type == OrderType::Market {
            return Err(ExchangeError::BadRequest(format!(
                "{} allows limit orders only",
                self.id()
            )));
        }
        let price = order.price.ok_or_else(|| {
            ExchangeError::BadRequest("limit order requires a price".to_string())
        })?;
        if order.amount.is_nan() || order.amount <= 0.0 {
            return Err(ExchangeError::BadRequest(format!(
                "order amount must be positive, got {}",
                order.amount
            )));
        }

        let market = self.market(&order.symbol).await?;
        let amount_text = truncate_to_precision(order.amount, market.precision.amount);
        let amount = amount_text.parse::<f64>().unwrap_or(0.0);
        if amount <= 0.0 {
            return Err(ExchangeError::BadRequest(format!(
                "{} order amount {} truncates to zero at {} precision",
                self.id(),
                order.amount,
                market.symbol
            )));
        }

        let response = self
            .dispatcher
            .private_post(
                "Trade",
                params(json!({
                    "pair": &market.id,
                    "type": order.side.as_str(),
                    "rate": to_precision(price, market.precision.price),
                    "amount": amount_text,
                })),
            )
            .await?;

        let result: LiquiTradeResult = serde_json::from_value(
            response.get("return").cloned().unwrap_or(Value::Null),
        )
        .map_err(|e| ExchangeError::InvalidResponse(format!("{} Trade: {}", self.id(), e)))?;

        let status = if result.remains == 0.0 {
            OrderStatus::Closed
        } else {
            OrderStatus::Open
        };

        tracing::info!(
            exchange = %self.id(),
            symbol = %market.symbol,
            side = order.side.as_str(),
            order_id = result.order_id,
            filled = result.received,
            remaining = result.remains,
            "Order placed"
        );

        Ok(Order {
            id: result.order_id.to_string(),
            symbol: Some(market.symbol),
            side: Some(order.side),
            price: Some(price),
            amount: Some(amount),
            filled: Some(result.received),
            remaining: Some(result.remains),
            status,
            timestamp: Some(current_time_ms()),
            info: response,
        })
    }

    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<()> {
        self.require(self.descriptor().has.cancel_order, "cancelOrder")?;
        if order_id.trim().is_empty() {
            return Err(ExchangeError::BadRequest("order id cannot be empty".to_string()));
        }
        self.dispatcher
            .private_post("CancelOrder", params(json!({"order_id": order_id})))
            .await?;
        tracing::info!(exchange = %self.id(), order_id = %order_id, "Order cancelled");
        Ok(())
    }

    async fn fetch_open_orders(&self, symbol: Option<&str>) -> ExchangeResult<Vec<Order>> {
        self.require(self.descriptor().has.fetch_open_orders, "fetchOpenOrders")?;
        self.load_markets(false).await?;

        let mut request = Params::new();
        if let Some(symbol) = symbol {
            let market = self.market(symbol).await?;
            request.insert("pair".to_string(), Value::String(market.id));
        }

        let response = self.dispatcher.private_post("ActiveOrders", request).await?;
        let entries = match response.get("return").and_then(Value::as_object) {
            Some(entries) => entries,
            // "no orders" arrives as a passed-through failure without `return`
            None => return Ok(Vec::new()),
        };

        let cache = self.markets.read().await;
        let mut orders = Vec::with_capacity(entries.len());
        for (id, raw) in entries {
            let active: LiquiActiveOrder = serde_json::from_value(raw.clone()).map_err(|e| {
                ExchangeError::InvalidResponse(format!("{} ActiveOrders {}: {}", self.id(), id, e))
            })?;
            orders.push(parse_active_order(id, &active, cache.by_id(&active.pair), raw.clone()));
        }
        orders.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }
}
