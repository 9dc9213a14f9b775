//! Liqui-family exchange REST client
//!
//! - Exchange descriptors with data-driven inheritance (`wex` extends `liqui`)
//! - Request dispatch with HMAC-SHA512 signing for private endpoints
//! - Error classification and ticker normalisation into canonical records

pub mod adapters;
pub mod config;
pub mod error;

pub use error::AppError;
