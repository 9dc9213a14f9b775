//! Exchange REST client - Entry Point
//!
//! 1. Loads `.env` and configuration (`config.yaml` or the path given)
//! 2. Builds the client for the configured exchange
//! 3. Loads markets and prints each configured ticker as JSON
//! 4. Prints balances when API credentials are present

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use exchange_rest::adapters::{create_client, ExchangeClient};
use exchange_rest::config::{self, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenvy::dotenv().ok();

    logging::init_logging();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    info!(path = %path.display(), "Loading configuration");

    let config = config::load_config(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    let client = create_client(&config).context("building exchange client")?;
    let markets = client.load_markets(false).await?;
    info!(exchange = %client.exchange_id(), markets = markets.len(), "Client ready");

    let symbols = if config.symbols.is_empty() {
        None
    } else {
        Some(config.symbols.as_slice())
    };

    if client.descriptor().has.fetch_tickers {
        let tickers = client.fetch_tickers(symbols).await?;
        for ticker in tickers.values() {
            println!("{}", serde_json::to_string(ticker)?);
        }
    } else {
        for symbol in &config.symbols {
            let ticker = client.fetch_ticker(symbol).await?;
            println!("{}", serde_json::to_string(&ticker)?);
        }
    }

    if client.has_credentials() {
        let balances = client.fetch_balance().await?;
        println!("{}", serde_json::to_string(&balances.free)?);
    } else {
        warn!(exchange = %client.exchange_id(), "No credentials, skipping balance");
    }

    Ok(())
}
