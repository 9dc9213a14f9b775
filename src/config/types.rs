//! Configuration types for the exchange client
//!
//! Loaded from YAML. Credentials are deliberately absent here; they are
//! read from the environment (see `Credentials::from_env`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::constants;

/// HTTP transport settings. Unset values fall back to `config::constants`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// TCP connect timeout in milliseconds
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(constants::http_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(constants::http_connect_timeout)
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange id resolved through the descriptor registry (e.g. "wex")
    pub exchange: String,
    /// Unified symbols to query (e.g. "BTC/USD")
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub http: HttpConfig,
    /// Descriptor fragment merged over the built-in descriptor
    #[serde(default)]
    pub overrides: Option<serde_json::Value>,
}

impl AppConfig {
    /// Validate configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.exchange.trim().is_empty() {
            return Err(AppError::Config("exchange id cannot be empty".to_string()));
        }

        for symbol in &self.symbols {
            let valid = symbol
                .split_once('/')
                .map(|(base, quote)| !base.is_empty() && !quote.is_empty())
                .unwrap_or(false);
            if !valid {
                return Err(AppError::Config(format!(
                    "symbol '{}' must look like BASE/QUOTE",
                    symbol
                )));
            }
        }

        if self.http.timeout_secs == Some(0) {
            return Err(AppError::Config("http.timeout_secs must be > 0".to_string()));
        }

        if let Some(overrides) = &self.overrides {
            if !overrides.is_object() {
                return Err(AppError::Config(
                    "overrides must be a mapping of descriptor fields".to_string(),
                ));
            }
        }

        Ok(())
    }
}
