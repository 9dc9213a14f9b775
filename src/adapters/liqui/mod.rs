//! Liqui Exchange Adapter
//!
//! REST client for the Liqui API family (Liqui and its clones).
//!
//! This module is organized into submodules:
//! - `types` - API response types
//! - `parse` - payload normalisation (markets, tickers, balances, orders)
//! - `adapter` - Main LiquiAdapter implementation

mod adapter;
mod parse;
mod types;

pub use adapter::LiquiAdapter;
pub use parse::{
    common_currency_code, normalize_ticker, parse_balance, parse_market, TickerFields,
    LIQUI_TICKER_FIELDS,
};
pub use types::{LiquiActiveOrder, LiquiInfo, LiquiPair, LiquiTradeResult};
