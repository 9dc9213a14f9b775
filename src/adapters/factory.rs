//! Client factory for configured exchange selection
//!
//! Resolves the configured exchange id through the descriptor registry,
//! applies config overrides with the descriptor merge, and wires the
//! transport, signer and ticker mapping into a `LiquiAdapter`.

use std::sync::Arc;

use crate::adapters::descriptor::{merge, DescriptorRegistry, ExchangeDescriptor, PartialDescriptor};
use crate::adapters::dispatcher::Dispatcher;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::liqui::{LiquiAdapter, TickerFields, LIQUI_TICKER_FIELDS};
use crate::adapters::signing::{Credentials, HmacSigner};
use crate::adapters::transport::{HttpTransport, ReqwestTransport};
use crate::adapters::wex::WEX_TICKER_FIELDS;
use crate::config::AppConfig;

/// Ticker field mapping for a Liqui-family exchange id
pub fn ticker_fields_for(exchange_id: &str) -> ExchangeResult<TickerFields> {
    match exchange_id {
        "liqui" => Ok(LIQUI_TICKER_FIELDS),
        "wex" => Ok(WEX_TICKER_FIELDS),
        other => Err(ExchangeError::NotSupported(format!(
            "no client for exchange '{}'",
            other
        ))),
    }
}

/// Effective descriptor for the configured exchange, overrides applied
pub fn resolve_descriptor(
    config: &AppConfig,
    registry: &DescriptorRegistry,
) -> ExchangeResult<ExchangeDescriptor> {
    let descriptor = registry.resolve(&config.exchange)?;
    match &config.overrides {
        Some(overrides) => {
            let fragment = PartialDescriptor::from_value(overrides.clone())?;
            let merged = merge(&descriptor, &fragment)?;
            tracing::info!(
                exchange = %merged.id,
                public = ?merged.base_url(crate::adapters::descriptor::AccessClass::Public),
                "Descriptor overrides applied"
            );
            Ok(merged)
        }
        None => Ok(descriptor),
    }
}

/// Build a client with explicit collaborators
pub fn create_client_with(
    config: &AppConfig,
    registry: &DescriptorRegistry,
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Credentials>,
) -> ExchangeResult<LiquiAdapter> {
    let descriptor = resolve_descriptor(config, registry)?;
    let fields = ticker_fields_for(&descriptor.id)?;

    let mut dispatcher = Dispatcher::new(Arc::new(descriptor), transport);
    match credentials {
        Some(credentials) => {
            dispatcher = dispatcher.with_signer(Arc::new(HmacSigner::new(credentials)));
        }
        None => {
            tracing::info!(
                exchange = %config.exchange,
                "No API credentials, private endpoints disabled"
            );
        }
    }

    Ok(LiquiAdapter::new(dispatcher, fields))
}

/// Build the client for `config.exchange` with built-in descriptors,
/// a reqwest transport and credentials from the environment
pub fn create_client(config: &AppConfig) -> ExchangeResult<LiquiAdapter> {
    let registry = DescriptorRegistry::builtin()?;
    let transport = Arc::new(ReqwestTransport::new(&config.exchange, &config.http));
    let credentials = Credentials::from_env(&config.exchange);
    create_client_with(config, &registry, transport, credentials)
}
