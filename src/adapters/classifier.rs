//! Response classification
//!
//! Liqui-family APIs report logical failures through a `success` flag and
//! an `error` string on an otherwise normal 200 response. Classification
//! returns a `Verdict` value; turning it into an `ExchangeError` happens
//! once, at the dispatch boundary (`classify_response`).

use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Error text the API returns for an empty order list
pub const NO_ORDERS: &str = "no orders";
/// Substring of the insufficient-balance message, misspelled upstream
pub const INSUFFICIENT_FUNDS_MARKER: &str = "Not enougth";
pub const REQUESTS_TOO_OFTEN: &str = "Requests too often";
pub const NOT_AVAILABLE: &str = "not available";
pub const EXTERNAL_SERVICE_UNAVAILABLE: &str = "external service unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InsufficientFunds,
    DDoSProtection,
    Exchange,
}

/// A logically failed response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub kind: FailureKind,
    /// The `error` string as sent ("" when absent)
    pub message: String,
    /// Full decoded response
    pub payload: Value,
}

impl ApiFailure {
    /// Error carrying "<exchange id> <serialized response>"
    pub fn into_error(self, exchange_id: &str) -> ExchangeError {
        let detail = format!("{} {}", exchange_id, self.payload);
        match self.kind {
            FailureKind::InsufficientFunds => ExchangeError::InsufficientFunds(detail),
            FailureKind::DDoSProtection => ExchangeError::DDoSProtection(detail),
            FailureKind::Exchange => ExchangeError::Exchange(detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail(ApiFailure),
}

pub trait ResponseClassifier: Send + Sync {
    fn classify(&self, response: &Value) -> Verdict;
}

/// Classifier for the `success` / `error` convention
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessFlagClassifier;

impl ResponseClassifier for SuccessFlagClassifier {
    fn classify(&self, response: &Value) -> Verdict {
        let success = match response.get("success") {
            Some(flag) => flag,
            None => return Verdict::Pass,
        };
        if is_truthy(success) {
            return Verdict::Pass;
        }

        let message = response
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default();

        // empty order lists are reported as a failure
        if message == NO_ORDERS {
            return Verdict::Pass;
        }

        let kind = if message.contains(INSUFFICIENT_FUNDS_MARKER) {
            FailureKind::InsufficientFunds
        } else if message == REQUESTS_TOO_OFTEN
            || message == NOT_AVAILABLE
            || message == EXTERNAL_SERVICE_UNAVAILABLE
        {
            FailureKind::DDoSProtection
        } else {
            FailureKind::Exchange
        };

        Verdict::Fail(ApiFailure {
            kind,
            message: message.to_string(),
            payload: response.clone(),
        })
    }
}

/// Loose truthiness of the `success` flag (`1`, `true`, `"1"` all pass)
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Run the classifier and return the response unchanged, or the typed error
pub fn classify_response(
    classifier: &dyn ResponseClassifier,
    exchange_id: &str,
    response: Value,
) -> ExchangeResult<Value> {
    match classifier.classify(&response) {
        Verdict::Pass => Ok(response),
        Verdict::Fail(failure) => {
            tracing::warn!(
                exchange = %exchange_id,
                kind = ?failure.kind,
                error = %failure.message,
                "Exchange rejected request"
            );
            Err(failure.into_error(exchange_id))
        }
    }
}
