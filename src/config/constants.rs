//! Application-wide constants and configuration defaults
//!
//! HTTP tuning values live here so they can be overridden via
//! environment variables without touching the YAML config.

use std::time::Duration;

// =============================================================================
// HTTP Client Configuration
// =============================================================================

/// HTTP request timeout (default: 10 seconds)
///
/// Environment variable: `HTTP_TIMEOUT_SECS`
pub fn http_timeout() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

/// HTTP connect timeout (default: 1500ms)
///
/// Environment variable: `HTTP_CONNECT_TIMEOUT_MS`
pub fn http_connect_timeout() -> Duration {
    let ms = std::env::var("HTTP_CONNECT_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1500);
    Duration::from_millis(ms)
}

/// Max idle connections kept per host (default: 5)
///
/// Environment variable: `HTTP_POOL_MAX_IDLE`
pub fn http_pool_max_idle() -> usize {
    std::env::var("HTTP_POOL_MAX_IDLE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5)
}

/// How long idle pooled connections are kept
pub const HTTP_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// TCP keepalive interval
pub const HTTP_TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("exchange_rest/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// Credentials
// =============================================================================

/// Environment variable holding the API key for an exchange id (`wex` -> `WEX_API_KEY`)
pub fn api_key_var(exchange_id: &str) -> String {
    format!("{}_API_KEY", exchange_id.to_uppercase())
}

/// Environment variable holding the API secret for an exchange id (`wex` -> `WEX_SECRET`)
pub fn secret_var(exchange_id: &str) -> String {
    format!("{}_SECRET", exchange_id.to_uppercase())
}
