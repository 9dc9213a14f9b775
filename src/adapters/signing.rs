//! Request signing for private endpoints
//!
//! Liqui-family private calls carry a form body containing a nonce and
//! the endpoint name. The body is signed with HMAC-SHA512 keyed by the
//! API secret and sent hex-encoded in the `Sign` header next to `Key`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::config::constants;

type HmacSha512 = Hmac<Sha512>;

// =============================================================================
// Credentials
// =============================================================================

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Read `<ID>_API_KEY` / `<ID>_SECRET`; `None` unless both are set and non-empty
    pub fn from_env(exchange_id: &str) -> Option<Self> {
        let api_key = std::env::var(constants::api_key_var(exchange_id)).ok()?;
        let secret = std::env::var(constants::secret_var(exchange_id)).ok()?;
        if api_key.trim().is_empty() || secret.trim().is_empty() {
            return None;
        }
        Some(Self::new(api_key, secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &crate::config::logging::sanitize(&self.api_key))
            .field("secret", &"***")
            .finish()
    }
}

// =============================================================================
// Nonce
// =============================================================================

fn current_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Strictly increasing nonce, safe to share between tasks
///
/// Each value is `max(previous + 1, now in seconds)`, so nonces track the
/// clock when calls are sparse and never repeat when they are dense.
#[derive(Debug, Default)]
pub struct NonceSource {
    last: AtomicU64,
}

impl NonceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start above `value` (e.g. to resume after the last nonce the server saw)
    pub fn starting_after(value: u64) -> Self {
        Self {
            last: AtomicU64::new(value),
        }
    }

    pub fn next(&self) -> u64 {
        let now = current_time_secs();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(last.saturating_add(1).max(now))
            })
            .unwrap_or_else(|last| last);
        previous.saturating_add(1).max(now)
    }
}

// =============================================================================
// Signer
// =============================================================================

/// Authentication collaborator used by the dispatcher for private calls
pub trait RequestSigner: Send + Sync {
    fn api_key(&self) -> &str;

    fn next_nonce(&self) -> u64;

    /// Signature over the exact body bytes that will be sent
    fn sign(&self, body: &str) -> ExchangeResult<String>;
}

/// HMAC-SHA512 signer, hex-encoded output
#[derive(Debug, Clone)]
pub struct HmacSigner {
    credentials: Credentials,
    nonce: Arc<NonceSource>,
}

impl HmacSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_nonce(credentials, Arc::new(NonceSource::new()))
    }

    pub fn with_nonce(credentials: Credentials, nonce: Arc<NonceSource>) -> Self {
        Self { credentials, nonce }
    }
}

impl RequestSigner for HmacSigner {
    fn api_key(&self) -> &str {
        &self.credentials.api_key
    }

    fn next_nonce(&self) -> u64 {
        self.nonce.next()
    }

    fn sign(&self, body: &str) -> ExchangeResult<String> {
        sign_hmac_sha512(body, &self.credentials.secret)
    }
}

/// hex(HMAC-SHA512(body, secret))
pub fn sign_hmac_sha512(body: &str, secret: &str) -> ExchangeResult<String> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Authentication(format!("Invalid secret: {}", e)))?;
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
