//! Exchange descriptor types
//!
//! A descriptor is the static description of one exchange: identity,
//! capability flags, base URLs, the endpoint table and the fee schedule.
//! Field names follow the camelCase keys used in the descriptor documents.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Access class / HTTP verb
// =============================================================================

/// Whether an endpoint needs authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessClass {
    Public,
    Private,
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessClass::Public => write!(f, "public"),
            AccessClass::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// access class -> HTTP verb -> logical endpoint names (may contain `{placeholders}`)
pub type EndpointTable = BTreeMap<AccessClass, BTreeMap<HttpMethod, Vec<String>>>;

// =============================================================================
// Descriptor sections
// =============================================================================

/// Capability flags advertised by an exchange
///
/// Flags are descriptor data. `ExchangeClient` gates the operations it
/// implements on them; `cors` and `withdraw` are carried for callers only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    pub cors: bool,
    pub fetch_tickers: bool,
    pub fetch_balance: bool,
    pub create_order: bool,
    pub cancel_order: bool,
    pub fetch_open_orders: bool,
    pub withdraw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Urls {
    #[serde(default)]
    pub logo: Option<String>,
    /// Base URL per access class
    pub api: BTreeMap<AccessClass, String>,
    #[serde(default)]
    pub www: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub doc: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingFees {
    /// Maker rate as a fraction (0.002 == 0.2%)
    pub maker: f64,
    /// Taker rate as a fraction
    pub taker: f64,
    #[serde(default = "default_true")]
    pub percentage: bool,
    #[serde(default)]
    pub tier_based: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    pub trading: TradingFees,
}

/// Effective, fully-populated description of one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeDescriptor {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "one_or_many")]
    pub countries: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Minimum spacing between requests in milliseconds, for an outer limiter
    #[serde(default)]
    pub rate_limit: u64,
    #[serde(default)]
    pub has: Capabilities,
    pub urls: Urls,
    pub api: EndpointTable,
    pub fees: Fees,
}

impl ExchangeDescriptor {
    /// Base URL for an access class
    pub fn base_url(&self, access: AccessClass) -> Option<&str> {
        self.urls.api.get(&access).map(String::as_str)
    }

    /// Endpoint names declared for (access, method); empty when none
    pub fn endpoints(&self, access: AccessClass, method: HttpMethod) -> &[String] {
        self.api
            .get(&access)
            .and_then(|verbs| verbs.get(&method))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn declares(&self, access: AccessClass, method: HttpMethod, endpoint: &str) -> bool {
        self.endpoints(access, method).iter().any(|e| e == endpoint)
    }

    /// Check the structural invariants of a descriptor
    ///
    /// - identity fields are non-empty
    /// - every access class in the endpoint table has a base URL
    /// - no endpoint is listed twice for the same (access, method)
    /// - fee rates are finite
    pub fn validate(&self) -> ExchangeResult<()> {
        if self.id.trim().is_empty() {
            return Err(ExchangeError::InvalidDescriptor("id cannot be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(ExchangeError::InvalidDescriptor(format!(
                "'{}': name cannot be empty",
                self.id
            )));
        }

        for (access, verbs) in &self.api {
            let has_base = self
                .base_url(*access)
                .map(|url| !url.trim().is_empty())
                .unwrap_or(false);
            if !has_base {
                return Err(ExchangeError::InvalidDescriptor(format!(
                    "'{}': no base URL for {} endpoints",
                    self.id, access
                )));
            }

            for (method, names) in verbs {
                let mut seen = HashSet::new();
                for name in names {
                    if name.trim().is_empty() {
                        return Err(ExchangeError::InvalidDescriptor(format!(
                            "'{}': empty endpoint name under {} {}",
                            self.id, access, method
                        )));
                    }
                    if !seen.insert(name.as_str()) {
                        return Err(ExchangeError::InvalidDescriptor(format!(
                            "'{}': endpoint '{}' listed twice under {} {}",
                            self.id, name, access, method
                        )));
                    }
                }
            }
        }

        let trading = &self.fees.trading;
        if !trading.maker.is_finite() || !trading.taker.is_finite() {
            return Err(ExchangeError::InvalidDescriptor(format!(
                "'{}': fee rates must be finite",
                self.id
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Serde helpers
// =============================================================================

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accept either `"NZ"` or `["NZ", "UA"]`
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
