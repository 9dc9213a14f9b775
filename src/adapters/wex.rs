//! WEX Exchange Adapter
//!
//! WEX runs the Liqui API unchanged apart from its ticker: `sell` carries
//! the bid and `buy` the ask. Everything else is `LiquiAdapter` driven by
//! the `wex` descriptor.

use serde_json::Value;

use crate::adapters::dispatcher::Dispatcher;
use crate::adapters::liqui::{self, LiquiAdapter, TickerFields};
use crate::adapters::types::{MarketInfo, Ticker};

pub const WEX_TICKER_FIELDS: TickerFields = TickerFields {
    bid: "sell",
    ask: "buy",
};

/// WEX client over an already configured dispatcher
pub fn adapter(dispatcher: Dispatcher) -> LiquiAdapter {
    LiquiAdapter::new(dispatcher, WEX_TICKER_FIELDS)
}

/// Normalise a WEX ticker payload
pub fn normalize_ticker(raw: &Value, market: Option<&MarketInfo>) -> Ticker {
    liqui::normalize_ticker(raw, market, &WEX_TICKER_FIELDS)
}
