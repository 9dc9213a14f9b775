//! Exchange adapter error types
//!
//! Every failure surfaced by dispatch, classification or an adapter
//! operation is an `ExchangeError`. Callers pick a retry policy from
//! `kind()` instead of matching on message text.

use std::time::Duration;

use thiserror::Error;

/// Exchange-specific error types for adapter operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Missing or rejected credentials for a private call
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Business-rule rejection: not enough balance for the request
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Rate limited or transiently unavailable; retry later with backoff
    #[error("DDoS protection: {0}")]
    DDoSProtection(String),

    /// Catch-all logical failure, carries "<exchange id> <raw response>"
    #[error("Exchange error: {0}")]
    Exchange(String),

    /// Connection to exchange failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Network operation timed out
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Non-success HTTP status that carries no classifiable payload
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Endpoint is not declared in the descriptor for this access class and method
    #[error("Unknown endpoint {access} {method} '{endpoint}'")]
    UnknownEndpoint {
        endpoint: String,
        access: String,
        method: String,
    },

    /// Request cannot be built from the supplied arguments
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Descriptor document is malformed or violates an invariant
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Operation is not advertised by the exchange descriptor
    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

/// Coarse retry class for an `ExchangeError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient network trouble, safe to retry
    Recoverable,
    /// Upstream asked us to slow down or is briefly unavailable
    RateLimit,
    /// Retrying the same request cannot succeed
    Fatal,
}

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DDoSProtection(_) => ErrorKind::RateLimit,
            Self::ConnectionFailed(_) | Self::NetworkTimeout(_) => ErrorKind::Recoverable,
            Self::Http { status, .. } if *status >= 500 => ErrorKind::Recoverable,
            _ => ErrorKind::Fatal,
        }
    }

    pub fn should_retry(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Fatal)
    }
}

impl ExchangeError {
    /// Map a transport failure; `timeout` is the limit the client was built with
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::NetworkTimeout(timeout.as_millis() as u64)
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}
