//! Exchange client trait definition
//!
//! The ExchangeClient trait is the common REST surface every exchange
//! integration exposes, whatever its wire protocol.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::adapters::descriptor::ExchangeDescriptor;
use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::{Balances, MarketInfo, Order, OrderRequest, Ticker};

/// Common trait for all exchange clients
///
/// Market data calls are public. Balance and order calls are private and
/// fail with `ExchangeError::Authentication` when no credentials are set.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Exchange id from the descriptor (e.g. "wex")
    fn exchange_id(&self) -> &str;

    /// Effective descriptor the client was built from
    fn descriptor(&self) -> &ExchangeDescriptor;

    /// Whether private calls can be signed
    fn has_credentials(&self) -> bool;

    /// Fetch and cache market metadata
    ///
    /// With `reload == false` a populated cache is returned as is.
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Vec<MarketInfo>>;

    /// Ticker for one unified symbol (e.g. "BTC/USD")
    async fn fetch_ticker(&self, symbol: &str) -> ExchangeResult<Ticker>;

    /// Tickers for several symbols in one call, keyed by symbol
    ///
    /// `None` requests every active market.
    async fn fetch_tickers(
        &self,
        symbols: Option<&[String]>,
    ) -> ExchangeResult<BTreeMap<String, Ticker>>;

    async fn fetch_balance(&self) -> ExchangeResult<Balances>;

    /// Place an order
    ///
    /// # Returns
    /// Order with exchange-assigned id and fill status
    async fn create_order(&self, order: OrderRequest) -> ExchangeResult<Order>;

    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<()>;

    /// Open orders, optionally for one symbol; empty when there are none
    async fn fetch_open_orders(&self, symbol: Option<&str>) -> ExchangeResult<Vec<Order>>;
}
