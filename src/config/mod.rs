//! Configuration module for client settings and YAML loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `HttpConfig`)
//! - YAML loading functionality (`load_config`)
//! - HTTP defaults with environment variable overrides
//! - Logging initialisation and redaction helpers

pub mod constants;
pub mod logging;
mod loader;
mod types;

pub use types::{AppConfig, HttpConfig};

pub use loader::{load_config, load_config_from_str};
