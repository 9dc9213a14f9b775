//! End-to-End Integration Tests against a mock WEX server
//!
//! Builds the client exactly as the binary does (config -> factory ->
//! reqwest transport) and points the descriptor at a mockito server via
//! config overrides.
//!
//! # Running the tests
//! ```bash
//! cargo test --test wex_client
//! ```

use mockito::{Matcher, Mock, ServerGuard};
use serial_test::serial;

use exchange_rest::adapters::errors::ExchangeError;
use exchange_rest::adapters::types::{OrderRequest, OrderSide, OrderStatus};
use exchange_rest::adapters::{create_client, ExchangeClient, LiquiAdapter};
use exchange_rest::config::load_config_from_str;

const INFO_BODY: &str = r#"{
    "server_time": 1505908800,
    "pairs": {
        "btc_usd": {"decimal_places": 3, "min_price": 0.1, "max_price": 400000, "min_amount": 0.001, "hidden": 0, "fee": 0.2},
        "eth_btc": {"decimal_places": 5, "min_price": 0.0001, "max_price": 10, "min_amount": 0.001, "hidden": 0, "fee": 0.2}
    }
}"#;

// =============================================================================
// Helpers
// =============================================================================

fn clear_credentials() {
    std::env::remove_var("WEX_API_KEY");
    std::env::remove_var("WEX_SECRET");
}

fn set_credentials() {
    std::env::set_var("WEX_API_KEY", "test-api-key");
    std::env::set_var("WEX_SECRET", "test-secret");
}

fn client_for(server: &ServerGuard) -> LiquiAdapter {
    let yaml = format!(
        r#"
exchange: wex
symbols: [BTC/USD]
http:
  timeout_secs: 5
overrides:
  urls:
    api:
      public: {url}/api
      private: {url}/tapi
"#,
        url = server.url()
    );
    let config = load_config_from_str(&yaml).unwrap();
    create_client(&config).unwrap()
}

async fn info_mock(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/api/3/info")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INFO_BODY)
        .create_async()
        .await
}

async fn private_mock(server: &mut ServerGuard, method: &str, body: &str) -> Mock {
    server
        .mock("POST", "/tapi")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_header("key", "test-api-key")
        .match_header("sign", Matcher::Regex("^[0-9a-f]{128}$".to_string()))
        .match_body(Matcher::Regex(format!("^nonce=[0-9]+&method={}", method)))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
#[serial]
async fn test_fetch_ticker_end_to_end() {
    clear_credentials();
    let mut server = mockito::Server::new_async().await;
    let info = info_mock(&mut server).await;
    let ticker_mock = server
        .mock("GET", "/api/3/ticker/btc_usd")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"btc_usd":{"high":4200,"low":3900,"avg":4050,"vol":1000,"vol_cur":0.25,"last":4100,"buy":4101,"sell":4099,"updated":1505908800}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert!(!client.has_credentials());

    let markets = client.load_markets(false).await.unwrap();
    assert_eq!(markets.len(), 2);

    let ticker = client.fetch_ticker("BTC/USD").await.unwrap();
    assert_eq!(ticker.symbol.as_deref(), Some("BTC/USD"));
    assert_eq!(ticker.timestamp, Some(1_505_908_800_000));
    assert_eq!(ticker.datetime.as_deref(), Some("2017-09-20T12:00:00.000Z"));
    // WEX: sell is the bid, buy is the ask
    assert_eq!(ticker.bid, Some(4099.0));
    assert_eq!(ticker.ask, Some(4101.0));
    assert_eq!(ticker.base_volume, Some(0.25));
    assert_eq!(ticker.quote_volume, Some(1000.0));
    assert!(ticker.vwap.is_none());

    info.assert_async().await;
    ticker_mock.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_fetch_tickers_single_call() {
    clear_credentials();
    let mut server = mockito::Server::new_async().await;
    info_mock(&mut server).await;
    let tickers_mock = server
        .mock("GET", "/api/3/ticker/btc_usd-eth_btc")
        .with_status(200)
        .with_body(r#"{"btc_usd":{"last":4100},"eth_btc":{"last":0.07}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let symbols = vec!["BTC/USD".to_string(), "ETH/BTC".to_string()];
    let tickers = client.fetch_tickers(Some(&symbols)).await.unwrap();

    assert_eq!(tickers.len(), 2);
    assert_eq!(tickers["ETH/BTC"].last, Some(0.07));
    tickers_mock.assert_async().await;
}

#[tokio::test]
#[serial]
async fn test_rate_limit_status_is_ddos_protection() {
    clear_credentials();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/3/info")
        .with_status(429)
        .with_body("Too Many Requests")
        .create_async()
        .await;

    let err = client_for(&server).load_markets(true).await.unwrap_err();
    assert!(matches!(err, ExchangeError::DDoSProtection(_)));
    assert!(err.should_retry());
}

#[tokio::test]
#[serial]
async fn test_gateway_error_is_http_error() {
    clear_credentials();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/3/info")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server).load_markets(true).await.unwrap_err();
    match err {
        ExchangeError::Http { status, ref body } => {
            assert_eq!(status, 502);
            assert!(body.contains("Bad Gateway"));
        }
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.should_retry());
}

// =============================================================================
// Private endpoints
// =============================================================================

#[tokio::test]
#[serial]
async fn test_private_call_without_credentials() {
    clear_credentials();
    let server = mockito::Server::new_async().await;

    let err = client_for(&server).fetch_balance().await.unwrap_err();
    assert!(matches!(err, ExchangeError::Authentication(_)));
}

#[tokio::test]
#[serial]
async fn test_fetch_balance_signed() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    let mock = private_mock(
        &mut server,
        "getInfo",
        r#"{"success":1,"return":{"funds":{"usd":325,"btc":23.998,"bcc":1.5},"open_orders":0}}"#,
    )
    .await;

    let client = client_for(&server);
    assert!(client.has_credentials());

    let balances = client.fetch_balance().await.unwrap();
    assert_eq!(balances.free["USD"], 325.0);
    assert_eq!(balances.free["BTC"], 23.998);
    assert_eq!(balances.free["BCH"], 1.5);

    mock.assert_async().await;
    clear_credentials();
}

#[tokio::test]
#[serial]
async fn test_create_order_signed() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    info_mock(&mut server).await;
    let mock = private_mock(
        &mut server,
        "Trade",
        r#"{"success":1,"return":{"received":0,"remains":0.5,"order_id":343152,"funds":{}}}"#,
    )
    .await;

    let order = client_for(&server)
        .create_order(OrderRequest::limit("BTC/USD", OrderSide::Sell, 4100.0, 0.5))
        .await
        .unwrap();

    assert_eq!(order.id, "343152");
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.remaining, Some(0.5));
    mock.assert_async().await;
    clear_credentials();
}

#[tokio::test]
#[serial]
async fn test_insufficient_funds() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    info_mock(&mut server).await;
    private_mock(
        &mut server,
        "Trade",
        r#"{"success":0,"error":"It is Not enougth BTC in the account for sale."}"#,
    )
    .await;

    let err = client_for(&server)
        .create_order(OrderRequest::limit("BTC/USD", OrderSide::Sell, 4100.0, 100.0))
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::InsufficientFunds(_)));
    assert!(!err.should_retry());
    assert!(err.to_string().contains("wex "));
    clear_credentials();
}

#[tokio::test]
#[serial]
async fn test_requests_too_often() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    private_mock(
        &mut server,
        "getInfo",
        r#"{"success":0,"error":"Requests too often"}"#,
    )
    .await;

    let err = client_for(&server).fetch_balance().await.unwrap_err();
    assert!(matches!(err, ExchangeError::DDoSProtection(_)));
    clear_credentials();
}

#[tokio::test]
#[serial]
async fn test_no_orders_is_empty_list() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    info_mock(&mut server).await;
    private_mock(
        &mut server,
        "ActiveOrders",
        r#"{"success":0,"error":"no orders"}"#,
    )
    .await;

    let orders = client_for(&server).fetch_open_orders(None).await.unwrap();
    assert!(orders.is_empty());
    clear_credentials();
}

#[tokio::test]
#[serial]
async fn test_cancel_order_signed() {
    set_credentials();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/tapi")
        .match_header("key", "test-api-key")
        .match_body(Matcher::Regex("^nonce=[0-9]+&method=CancelOrder&order_id=343152$".to_string()))
        .with_status(200)
        .with_body(r#"{"success":1,"return":{"order_id":343152,"funds":{}}}"#)
        .create_async()
        .await;

    client_for(&server).cancel_order("343152").await.unwrap();
    mock.assert_async().await;
    clear_credentials();
}
